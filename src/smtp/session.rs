//! SMTP session driver.

use tracing::debug;

use crate::Result;

use super::client::{SmtpClient, SmtpConnector, TlsPolicy};

/// Deliver one message through the relay at `addr`.
///
/// Runs dial, `MAIL FROM`, one `RCPT TO` per recipient in order, `DATA`,
/// the message, end-of-data and `QUIT`. The first failing step ends the
/// session and its error is returned; nothing is rolled back for recipients
/// the relay already accepted.
pub async fn send<C: SmtpConnector>(
    connector: &C,
    addr: &str,
    from: &str,
    to: &[String],
    data: &[u8],
    tls: TlsPolicy,
) -> Result<()> {
    debug!(addr, ?tls, "Dialing SMTP relay");
    let mut client = connector.dial(addr, tls).await?;

    debug!(from, "MAIL FROM");
    client.mail(from).await?;

    for rcpt in to {
        debug!(rcpt = rcpt.as_str(), "RCPT TO");
        client.rcpt(rcpt).await?;
    }

    debug!(bytes = data.len(), "DATA");
    client.data().await?;
    client.write_data(data).await?;
    client.close_data().await?;

    debug!("QUIT");
    client.quit().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpMailError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Step {
        Dial(String, TlsPolicy),
        Mail(String),
        Rcpt(String),
        Data,
        Write(Vec<u8>),
        Close,
        Quit,
    }

    /// Records every call and fails the step matching `fail_on`.
    #[derive(Clone, Default)]
    struct Recorder {
        steps: Arc<Mutex<Vec<Step>>>,
        fail_on: Option<Step>,
    }

    impl Recorder {
        fn failing_on(step: Step) -> Self {
            Self {
                fail_on: Some(step),
                ..Default::default()
            }
        }

        fn record(&self, step: Step) -> crate::Result<()> {
            self.steps.lock().unwrap().push(step.clone());
            if self.fail_on.as_ref() == Some(&step) {
                return Err(HttpMailError::Transport(format!("{step:?} rejected")));
            }
            Ok(())
        }

        fn steps(&self) -> Vec<Step> {
            self.steps.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SmtpClient for Recorder {
        async fn mail(&mut self, from: &str) -> crate::Result<()> {
            self.record(Step::Mail(from.to_string()))
        }
        async fn rcpt(&mut self, to: &str) -> crate::Result<()> {
            self.record(Step::Rcpt(to.to_string()))
        }
        async fn data(&mut self) -> crate::Result<()> {
            self.record(Step::Data)
        }
        async fn write_data(&mut self, data: &[u8]) -> crate::Result<()> {
            self.record(Step::Write(data.to_vec()))
        }
        async fn close_data(&mut self) -> crate::Result<()> {
            self.record(Step::Close)
        }
        async fn quit(&mut self) -> crate::Result<()> {
            self.record(Step::Quit)
        }
    }

    #[async_trait]
    impl SmtpConnector for Recorder {
        type Client = Recorder;

        async fn dial(&self, addr: &str, tls: TlsPolicy) -> crate::Result<Recorder> {
            self.record(Step::Dial(addr.to_string(), tls))?;
            Ok(self.clone())
        }
    }

    fn recipients() -> Vec<String> {
        vec!["a@x.com".to_string(), "b@x.com".to_string()]
    }

    #[tokio::test]
    async fn test_send_runs_full_sequence() {
        let recorder = Recorder::default();

        send(
            &recorder,
            "relay:25",
            "me@x.com",
            &recipients(),
            b"payload",
            TlsPolicy::Required,
        )
        .await
        .unwrap();

        assert_eq!(
            recorder.steps(),
            vec![
                Step::Dial("relay:25".to_string(), TlsPolicy::Required),
                Step::Mail("me@x.com".to_string()),
                Step::Rcpt("a@x.com".to_string()),
                Step::Rcpt("b@x.com".to_string()),
                Step::Data,
                Step::Write(b"payload".to_vec()),
                Step::Close,
                Step::Quit,
            ]
        );
    }

    #[tokio::test]
    async fn test_second_rcpt_failure_skips_data_phase() {
        let recorder = Recorder::failing_on(Step::Rcpt("b@x.com".to_string()));

        let err = send(
            &recorder,
            "relay:25",
            "me@x.com",
            &recipients(),
            b"payload",
            TlsPolicy::Skip,
        )
        .await
        .unwrap_err();

        assert!(err.is_transport());
        let steps = recorder.steps();
        assert_eq!(steps.last(), Some(&Step::Rcpt("b@x.com".to_string())));
        assert!(!steps.contains(&Step::Data));
        assert!(!steps.contains(&Step::Quit));
    }

    #[tokio::test]
    async fn test_dial_failure_is_surfaced() {
        let recorder = Recorder::failing_on(Step::Dial("relay:25".to_string(), TlsPolicy::Skip));

        let result = send(
            &recorder,
            "relay:25",
            "me@x.com",
            &recipients(),
            b"payload",
            TlsPolicy::Skip,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(recorder.steps().len(), 1);
    }

    #[tokio::test]
    async fn test_mail_failure_stops_before_rcpt() {
        let recorder = Recorder::failing_on(Step::Mail("me@x.com".to_string()));

        let result = send(
            &recorder,
            "relay:25",
            "me@x.com",
            &recipients(),
            b"payload",
            TlsPolicy::Skip,
        )
        .await;

        assert!(result.is_err());
        assert!(!recorder
            .steps()
            .iter()
            .any(|s| matches!(s, Step::Rcpt(_))));
    }

    #[tokio::test]
    async fn test_close_failure_skips_quit() {
        let recorder = Recorder::failing_on(Step::Close);

        let result = send(
            &recorder,
            "relay:25",
            "me@x.com",
            &recipients(),
            b"payload",
            TlsPolicy::Skip,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(recorder.steps().last(), Some(&Step::Close));
    }
}
