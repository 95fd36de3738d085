//! Acknowledgment (`ACK`) messages returned by receiving systems.

use crate::message::{Delimiters, Hl7Message, Segment};
use crate::patient::MessageHeader;
use crate::{Hl7Error, Hl7Result};
use std::fmt;

/// `MSA-1` acknowledgment code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AckCode {
    /// `AA`
    ApplicationAccept,
    /// `AE`
    ApplicationError,
    /// `AR`
    ApplicationReject,
    /// `CA`
    CommitAccept,
    /// `CE`
    CommitError,
    /// `CR`
    CommitReject,
}

impl AckCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApplicationAccept => "AA",
            Self::ApplicationError => "AE",
            Self::ApplicationReject => "AR",
            Self::CommitAccept => "CA",
            Self::CommitError => "CE",
            Self::CommitReject => "CR",
        }
    }

    pub fn parse(s: &str) -> Hl7Result<Self> {
        match s {
            "AA" => Ok(Self::ApplicationAccept),
            "AE" => Ok(Self::ApplicationError),
            "AR" => Ok(Self::ApplicationReject),
            "CA" => Ok(Self::CommitAccept),
            "CE" => Ok(Self::CommitError),
            "CR" => Ok(Self::CommitReject),
            other => Err(Hl7Error::Malformed(format!(
                "unknown acknowledgment code: '{other}'"
            ))),
        }
    }

    /// True for `AA` and `CA`.
    pub fn is_accept(self) -> bool {
        matches!(self, Self::ApplicationAccept | Self::CommitAccept)
    }
}

impl fmt::Display for AckCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `MSA` content of an acknowledgment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Acknowledgment {
    pub code: AckCode,
    /// `MSA-2`, the control id of the message being acknowledged.
    pub control_id: String,
    /// `MSA-3`, free text from the receiver.
    pub text: Option<String>,
}

impl Acknowledgment {
    /// Reads the `MSA` segment of an acknowledgment message.
    ///
    /// # Errors
    ///
    /// Returns [`Hl7Error::MissingField`] if `MSA` or `MSA-1` is absent and
    /// [`Hl7Error::Malformed`] for an unknown code or unparseable text.
    pub fn parse(text: &str) -> Hl7Result<Self> {
        let message = Hl7Message::parse(text)?;
        let msa = message
            .segment("MSA")
            .ok_or_else(|| Hl7Error::missing("MSA"))?;

        let code = msa.value(1).ok_or_else(|| Hl7Error::missing("MSA-1"))?;
        let code = AckCode::parse(&code)?;

        Ok(Self {
            code,
            control_id: msa.value(2).unwrap_or_default(),
            text: msa.value(3).filter(|t| !t.is_empty()),
        })
    }

    /// Renders an `ACK` message. Sender and receiver in `header` are swapped, as the
    /// acknowledgment travels back to the original sender.
    pub fn render(&self, header: &MessageHeader) -> String {
        let delimiters = Delimiters::default();
        let reply_header = MessageHeader {
            sending_application: header.receiving_application.clone(),
            sending_facility: header.receiving_facility.clone(),
            receiving_application: header.sending_application.clone(),
            receiving_facility: header.sending_facility.clone(),
            ..header.clone()
        };
        let msh = reply_header.to_segment(delimiters, &["ACK", "A01"]);

        let mut msa = Segment::new("MSA", delimiters);
        msa.set_value(1, self.code.as_str())
            .set_value(2, &self.control_id);
        if let Some(text) = &self.text {
            msa.set_value(3, text);
        }

        Hl7Message::from_segments(delimiters, vec![msh, msa]).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_application_accept() {
        let ack = Acknowledgment::parse(
            "MSH|^~\\&|HL7RECV|ANYWHERE|INFOCTOR|HOSPITAL|20230101000000||ACK^A01|MSG00001|P|2.3\rMSA|AA|MSG00001",
        )
        .expect("parse ack");

        assert_eq!(ack.code, AckCode::ApplicationAccept);
        assert!(ack.code.is_accept());
        assert_eq!(ack.control_id, "MSG00001");
        assert_eq!(ack.text, None);
    }

    #[test]
    fn parses_error_text() {
        let ack = Acknowledgment::parse("MSH|^~\\&|R\rMSA|AE|MSG00002|unknown patient")
            .expect("parse ack");

        assert_eq!(ack.code, AckCode::ApplicationError);
        assert!(!ack.code.is_accept());
        assert_eq!(ack.text.as_deref(), Some("unknown patient"));
    }

    #[test]
    fn rejects_missing_msa_and_unknown_codes() {
        assert!(matches!(
            Acknowledgment::parse("MSH|^~\\&|R"),
            Err(Hl7Error::MissingField { path }) if path == "MSA"
        ));
        assert!(matches!(
            Acknowledgment::parse("MSH|^~\\&|R\rMSA|ZZ|1"),
            Err(Hl7Error::Malformed(_))
        ));
    }

    #[test]
    fn render_swaps_sender_and_receiver() {
        let ack = Acknowledgment {
            code: AckCode::ApplicationAccept,
            control_id: "MSG00001".into(),
            text: None,
        };

        let text = ack.render(&MessageHeader::default());
        assert_eq!(
            text,
            "MSH|^~\\&|HL7RECV|ANYWHERE|INFOCTOR|HOSPITAL|20230101000000||ACK^A01|MSG00001|P|2.3\rMSA|AA|MSG00001"
        );
        assert_eq!(Acknowledgment::parse(&text).expect("reparse"), ack);
    }
}
