/// Deterministic trial-division primality test. Dictionary primes grow with vocabulary size, which
/// keeps the candidates small enough that this never shows up in a profile.
pub fn is_prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i: i64 = 5;
    while i.saturating_mul(i) <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// The smallest prime strictly greater than `n`.
pub fn next_prime(n: i64) -> i64 {
    let mut candidate = n.max(1) + 1;
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}
