use super::attachment::{Attachment, ImagePayload};
use crate::constants::IMAGE_ATTACHED_MARKER;

/// One user turn, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Text exactly as typed; this is what the model receives
    pub text: String,
    /// Image bytes with the data URI prefix stripped
    pub image: Option<ImagePayload>,
}

impl Submission {
    /// Transcript text: the typed text, preceded by a marker line when an image went along
    pub fn display_text(&self) -> String {
        if self.image.is_some() {
            format!("{}\n{}", IMAGE_ATTACHED_MARKER, self.text)
        } else {
            self.text.clone()
        }
    }
}

/// Assemble a submission, or `None` when there is nothing to send
pub fn compose(text: &str, attachment: Option<&Attachment>) -> Option<Submission> {
    if text.trim().is_empty() && attachment.is_none() {
        return None;
    }

    Some(Submission {
        text: text.to_string(),
        image: attachment.map(Attachment::to_image_payload),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_composes_nothing() {
        assert_eq!(compose("", None), None);
        assert_eq!(compose("  \n\t ", None), None);
    }

    #[test]
    fn test_text_only() {
        let submission = compose("Pasien tekanan darah 160/95", None).unwrap();
        assert_eq!(submission.text, "Pasien tekanan darah 160/95");
        assert_eq!(submission.image, None);
        assert_eq!(submission.display_text(), "Pasien tekanan darah 160/95");
    }

    #[test]
    fn test_image_without_text_is_accepted() {
        let attachment = Attachment::from_bytes("wound.jpg", "image/jpeg", b"jpegbytes");
        let submission = compose("   ", Some(&attachment)).unwrap();

        let image = submission.image.as_ref().unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, attachment.raw_payload());
        assert!(submission.display_text().starts_with(IMAGE_ATTACHED_MARKER));
    }
}
