//! Hex rendering shared by the capture log and debug output.

/// Render bytes as lowercase hex, space-separated: `[1, 2, 255]` → `"01 02 ff"`.
pub fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i != 0 {
            out.push(' ');
        }
        out.push_str(&format!("{b:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_space_separated_lowercase() {
        assert_eq!(hex_string(&[]), "");
        assert_eq!(hex_string(&[0x01]), "01");
        assert_eq!(hex_string(&[0x01, 0x02, 0xff]), "01 02 ff");
    }
}
