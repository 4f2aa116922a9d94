/// Identity function. Returns the request bytes unchanged; useful for
/// wire-protocol smoke tests where the worker's own timing doesn't matter.
pub fn echo(request: &[u8]) -> Vec<u8> {
    request.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_returns_input_unchanged() {
        assert_eq!(echo(b"hello"), b"hello".to_vec());
        assert_eq!(echo(b""), Vec::<u8>::new());
    }
}
