//! Runtime CPU feature probing.

/// Whether the running CPU implements `feature` (a `target_feature` name).
///
/// Unknown feature names report `false`.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn host_supports(feature: &str) -> bool {
    match feature {
        "sse2" => std::arch::is_x86_feature_detected!("sse2"),
        "ssse3" => std::arch::is_x86_feature_detected!("ssse3"),
        "sse4.1" => std::arch::is_x86_feature_detected!("sse4.1"),
        "avx" => std::arch::is_x86_feature_detected!("avx"),
        "avx2" => std::arch::is_x86_feature_detected!("avx2"),
        "avx512f" => std::arch::is_x86_feature_detected!("avx512f"),
        "avx512bw" => std::arch::is_x86_feature_detected!("avx512bw"),
        "avx512vl" => std::arch::is_x86_feature_detected!("avx512vl"),
        _ => false,
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
pub fn host_supports(_feature: &str) -> bool {
    false
}

/// The subset of `features` the running CPU lacks.
pub fn missing_features<'a>(features: &[&'a str]) -> Vec<&'a str> {
    features.iter().copied().filter(|feature| !host_supports(feature)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_features_are_unsupported() {
        assert!(!host_supports("not-a-feature"));
        assert_eq!(missing_features(&["not-a-feature"]), vec!["not-a-feature"]);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn x86_64_always_has_sse2() {
        assert!(host_supports("sse2"));
        assert!(missing_features(&["sse2"]).is_empty());
    }
}
