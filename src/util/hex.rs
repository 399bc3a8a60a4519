use std::fmt::Write;

/// Lower-case hex rendering of raw keys and values for logs and dumps.
pub fn hex(src: &[u8]) -> String {
    src.iter().fold(String::with_capacity(src.len() * 2), |mut acc, x| {
        let _ = write!(acc, "{:02x}", x);
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[]), "");
        assert_eq!(hex(&[0x00, 0x0f, 0xc0, 0xde]), "000fc0de");
        assert_eq!(hex(&42u32.to_be_bytes()), "0000002a");
    }
}
