//! Mail types for httpmail.

use std::fmt;

/// Line separator used when rendering a mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSeparator {
    /// Plain line feed, used for the display form returned to callers.
    Lf,
    /// Carriage return + line feed, used on the SMTP wire.
    Crlf,
}

impl LineSeparator {
    /// The separator as a string.
    pub fn as_str(self) -> &'static str {
        match self {
            LineSeparator::Lf => "\n",
            LineSeparator::Crlf => "\r\n",
        }
    }
}

/// A mail message ready to be relayed.
///
/// Construct one through [`assemble`](super::assemble), which guarantees a
/// non-empty sender and at least one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    /// Sender address.
    pub from: String,
    /// Recipient addresses, in request order.
    pub to: Vec<String>,
    /// Subject. Empty means no Subject header.
    pub subject: String,
    /// Mail body. May be empty.
    pub body: String,
}

impl Mail {
    /// Render the mail as header lines, a blank line and the body.
    ///
    /// ```text
    /// From: <from>
    /// To: <to,to>
    /// Subject: <subject>
    ///
    /// <body>
    /// ```
    pub fn render(&self, sep: LineSeparator) -> String {
        let lsep = sep.as_str();
        let mut out = format!(
            "From: {}{lsep}To: {}{lsep}",
            self.from,
            self.to.join(",")
        );
        if !self.subject.is_empty() {
            out.push_str(&format!("Subject: {}{lsep}", self.subject));
        }
        out.push_str(lsep);
        match sep {
            LineSeparator::Lf => out.push_str(&self.body),
            LineSeparator::Crlf => out.push_str(&normalize_crlf(&self.body)),
        }
        out.push_str(lsep);
        out
    }

    /// Bytes written during the DATA phase.
    ///
    /// The end-of-data marker is not included; closing the data stream
    /// writes it.
    pub fn wire_data(&self) -> Vec<u8> {
        self.render(LineSeparator::Crlf).into_bytes()
    }
}

impl fmt::Display for Mail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(LineSeparator::Lf))
    }
}

/// Turn any mix of `\n` and `\r\n` line endings into `\r\n`.
fn normalize_crlf(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\n', "\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mail() -> Mail {
        Mail {
            from: "me@x.com".to_string(),
            to: vec!["a@x.com".to_string(), "b@x.com".to_string()],
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
        }
    }

    /// Pull the header values back out of a display-form rendering.
    fn parse_headers(rendered: &str) -> (String, Vec<String>, String) {
        let mut from = String::new();
        let mut to = Vec::new();
        let mut subject = String::new();
        for line in rendered.lines() {
            if line.is_empty() {
                break;
            }
            if let Some(v) = line.strip_prefix("From: ") {
                from = v.to_string();
            } else if let Some(v) = line.strip_prefix("To: ") {
                to = v.split(',').map(str::to_string).collect();
            } else if let Some(v) = line.strip_prefix("Subject: ") {
                subject = v.to_string();
            }
        }
        (from, to, subject)
    }

    #[test]
    fn test_render_display_form() {
        assert_eq!(
            sample_mail().to_string(),
            "From: me@x.com\nTo: a@x.com,b@x.com\nSubject: Hi\n\nHello\n"
        );
    }

    #[test]
    fn test_render_without_subject() {
        let mail = Mail {
            subject: String::new(),
            ..sample_mail()
        };
        assert_eq!(
            mail.to_string(),
            "From: me@x.com\nTo: a@x.com,b@x.com\n\nHello\n"
        );
    }

    #[test]
    fn test_render_empty_body() {
        let mail = Mail {
            body: String::new(),
            ..sample_mail()
        };
        assert_eq!(
            mail.to_string(),
            "From: me@x.com\nTo: a@x.com,b@x.com\nSubject: Hi\n\n\n"
        );
    }

    #[test]
    fn test_wire_data_uses_crlf() {
        let data = sample_mail().wire_data();
        assert_eq!(
            String::from_utf8(data).unwrap(),
            "From: me@x.com\r\nTo: a@x.com,b@x.com\r\nSubject: Hi\r\n\r\nHello\r\n"
        );
    }

    #[test]
    fn test_wire_data_normalizes_body_newlines() {
        let mail = Mail {
            body: "line one\nline two\r\nline three".to_string(),
            ..sample_mail()
        };
        let wire = String::from_utf8(mail.wire_data()).unwrap();
        assert!(wire.ends_with("\r\n\r\nline one\r\nline two\r\nline three\r\n"));
        assert!(!wire.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_body_subject_text_is_not_special() {
        let mail = Mail {
            body: "Subject: from the body".to_string(),
            ..sample_mail()
        };
        assert!(mail.to_string().contains("Subject: Hi\n"));
    }

    #[test]
    fn test_headers_survive_rendering() {
        let cases = [
            sample_mail(),
            Mail {
                from: "sender@example.org".to_string(),
                to: vec!["only@example.org".to_string()],
                subject: String::new(),
                body: "multi\nline\nbody".to_string(),
            },
            Mail {
                from: "x@y.z".to_string(),
                to: vec!["1@y.z".into(), "2@y.z".into(), "3@y.z".into()],
                subject: "Weekly report - week 42".to_string(),
                body: String::new(),
            },
        ];

        for mail in cases {
            let (from, to, subject) = parse_headers(&mail.to_string());
            assert_eq!(from, mail.from);
            assert_eq!(to, mail.to);
            assert_eq!(subject, mail.subject);
        }
    }
}
