//! Frame validation rules.

use axum::extract::ws::{CloseFrame, close_code};

use crate::error::RealtimeError;

/// Rejects frames larger than `limit` bytes.
pub fn validate_frame_size(size: usize, limit: usize) -> Result<(), RealtimeError> {
    if size > limit {
        return Err(RealtimeError::FrameTooLarge { size, limit });
    }
    Ok(())
}

/// Whether a peer close is an ordinary departure rather than a fault.
///
/// Normal closure, going-away and abnormal closure (peer vanished) are
/// expected; everything else is logged as unexpected. Both end the
/// connection.
pub fn is_expected_close(frame: Option<&CloseFrame>) -> bool {
    match frame {
        None => true,
        Some(frame) => matches!(
            frame.code,
            close_code::NORMAL | close_code::AWAY | close_code::ABNORMAL
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_at_limit_is_accepted() {
        assert!(validate_frame_size(512, 512).is_ok());
    }

    #[test]
    fn test_frame_over_limit_is_rejected() {
        match validate_frame_size(513, 512) {
            Err(RealtimeError::FrameTooLarge { size, limit }) => {
                assert_eq!((size, limit), (513, 512));
            }
            other => panic!("expected FrameTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_close_classification() {
        let away = CloseFrame {
            code: close_code::AWAY,
            reason: "tab closed".into(),
        };
        let policy = CloseFrame {
            code: close_code::POLICY,
            reason: "".into(),
        };
        assert!(is_expected_close(None));
        assert!(is_expected_close(Some(&away)));
        assert!(!is_expected_close(Some(&policy)));
    }
}
