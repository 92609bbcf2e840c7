use reqwest::Client;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

pub trait Mailer {
    fn send(&self, domain: &str, email: &OutgoingEmail) -> Result<(), String>;
}

/// Mailgun messages API client. Sends are not cut short by a client-side
/// deadline.
#[derive(Debug, Clone)]
pub struct MailgunMailer {
    client: Client,
    api_base: String,
    api_key: String,
}

impl MailgunMailer {
    pub fn new(api_base: &str, api_key: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl Mailer for MailgunMailer {
    fn send(&self, domain: &str, email: &OutgoingEmail) -> Result<(), String> {
        let client = self.client.clone();
        let url = messages_url(&self.api_base, domain);
        let api_key = self.api_key.clone();
        let fields = form_fields(email);

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .post(url)
                    .basic_auth("api", Some(api_key))
                    .form(&fields)
                    .send()
                    .await
                    .and_then(|response| response.error_for_status())
                    .map(|_| ())
                    .map_err(|error| format!("failed to send email via mailgun: {error}"))
            })
        })
    }
}

fn messages_url(api_base: &str, domain: &str) -> String {
    format!("{api_base}/v3/{domain}/messages")
}

fn form_fields(email: &OutgoingEmail) -> Vec<(&'static str, String)> {
    vec![
        ("from", email.from.clone()),
        ("to", email.to.clone()),
        ("subject", email.subject.clone()),
        ("text", email.text.clone()),
    ]
}
