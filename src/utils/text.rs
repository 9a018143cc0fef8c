/// Collapse line breaks so a value fits in one table cell line.
pub fn single_line(text: &str) -> String {
    if !text.contains(['\n', '\r']) {
        return text.to_string();
    }
    text.split(['\n', '\r'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("plain"), "plain");
        assert_eq!(single_line("a\nb\r\nc"), "a b c");
        assert_eq!(single_line("\n"), "");
    }
}
