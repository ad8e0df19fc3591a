use crate::config::Envelope;
use crate::frame::model::CLOSE_NORMAL;
use crate::frame::{Frame, FrameKind};

/// Length of the xhr-streaming prelude.
pub const PRELUDE_LEN: usize = 2048;

/// Leading `h`s that identify the prelude.
const PRELUDE_MARK: &str = "hhhhhhhhhhhhh";

/// Classify one SockJS envelope.
///
/// Never fails, unknown envelopes come back as
/// [`Unexpected`](FrameKind::Unexpected) carrying the original text.
pub fn classify(text: &str) -> Frame {
    let frame = match text {
        "h" => Frame::text(FrameKind::Heartbeat, text),
        "o" => Frame::text(FrameKind::Open, text),
        t if t.len() == PRELUDE_LEN && t.starts_with(PRELUDE_MARK) => Frame::text(FrameKind::Prelude, t),
        t if t.starts_with('c') => Frame::close(CLOSE_NORMAL, &t[1..]),
        t if t.starts_with('a') => Frame::data(&t[1..]),
        t => {
            log::warn!("unexpected sockjs envelope: {:.100}", t);
            Frame::text(FrameKind::Unexpected, t)
        }
    };
    log::debug!("classified {}", frame);
    frame
}

/// Turn assembled text into a frame according to `envelope`.
#[inline]
pub fn classify_with(envelope: Envelope, text: &str) -> Frame {
    match envelope {
        Envelope::Raw => Frame::data(text),
        Envelope::SockJs => classify(text),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn markers() {
        assert_eq!(classify("h").kind(), FrameKind::Heartbeat);
        assert_eq!(classify("o").kind(), FrameKind::Open);

        let prelude = "h".repeat(PRELUDE_LEN);
        assert_eq!(classify(&prelude).kind(), FrameKind::Prelude);

        // too short for a prelude, and not a lone "h"
        assert_eq!(classify("hhh").kind(), FrameKind::Unexpected);
    }

    #[test]
    fn data_and_close() {
        let f = classify("a[\"x\"]");
        assert_eq!(f.kind(), FrameKind::Data);
        assert_eq!(f.text_payload(), Some("[\"x\"]"));

        let f = classify("c[3000,\"Go away!\"]");
        assert_eq!(f.kind(), FrameKind::Close);
        assert_eq!(f.text_payload(), Some("[3000,\"Go away!\"]"));
        assert_eq!(f.close_status(), Some(CLOSE_NORMAL));
    }

    #[test]
    fn unexpected() {
        for t in ["zzz", "", "O", "H"] {
            let f = classify(t);
            assert_eq!(f.kind(), FrameKind::Unexpected);
            assert_eq!(f.text_payload(), Some(t));
        }
    }

    #[test]
    fn raw() {
        let f = classify_with(Envelope::Raw, "h");
        assert_eq!(f.kind(), FrameKind::Data);
        assert_eq!(f.text_payload(), Some("h"));

        let f = classify_with(Envelope::SockJs, "h");
        assert_eq!(f.kind(), FrameKind::Heartbeat);
    }
}
