use std::borrow::Cow;

/// Upper bound, in bytes, for a single rendered log message.
pub const MAX_MESSAGE_LEN: usize = 255;

/// Reduces a message to its first line, truncated to [`MAX_MESSAGE_LEN`] bytes.
///
/// Truncation never splits a UTF-8 sequence. Messages that already fit are
/// borrowed unchanged.
pub fn single_line(message: &str) -> Cow<'_, str> {
    let line = match message.find(['\n', '\r']) {
        Some(end) => &message[..end],
        None => message,
    };

    if line.len() <= MAX_MESSAGE_LEN {
        return if line.len() == message.len() {
            Cow::Borrowed(message)
        } else {
            Cow::Owned(line.to_owned())
        };
    }

    let mut end = MAX_MESSAGE_LEN;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(line[..end].to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_is_borrowed() {
        let msg = "Successfully created window";
        assert!(matches!(single_line(msg), Cow::Borrowed(_)));
        assert_eq!(single_line(msg), msg);
    }

    #[test]
    fn keeps_only_first_line() {
        assert_eq!(single_line("error: bad token\n  at 3:4\n"), "error: bad token");
        assert_eq!(single_line("windows line\r\nsecond"), "windows line");
    }

    #[test]
    fn truncates_long_messages() {
        let msg = "x".repeat(1000);
        assert_eq!(single_line(&msg).len(), MAX_MESSAGE_LEN);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 'é' is two bytes; 200 of them straddle the limit at an odd offset.
        let msg = "é".repeat(200);
        let out = single_line(&msg);
        assert!(out.len() <= MAX_MESSAGE_LEN);
        assert!(out.chars().all(|c| c == 'é'));
    }

    #[test]
    fn empty_message() {
        assert_eq!(single_line(""), "");
        assert_eq!(single_line("\nafter"), "");
    }
}
