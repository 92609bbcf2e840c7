use reqwest::Client;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArtifact {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchedArtifact {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retrieves submission artifacts. Transport failures are `Err`; any HTTP
/// response, successful or not, is `Ok`.
pub trait ArtifactSource {
    fn get(&self, url: &str) -> Result<FetchedArtifact, String>;
}

/// Plain HTTP GET download that follows redirects. No client-side deadline
/// is set; the invocation limit of the host runtime bounds the request.
#[derive(Debug, Clone)]
pub struct HttpArtifactSource {
    client: Client,
}

impl HttpArtifactSource {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }
}

impl ArtifactSource for HttpArtifactSource {
    fn get(&self, url: &str) -> Result<FetchedArtifact, String> {
        let client = self.client.clone();
        let target = url.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .get(&target)
                    .send()
                    .await
                    .map_err(|error| format!("request to {target} failed: {error}"))?;

                let status = response.status().as_u16();
                if !response.status().is_success() {
                    return Ok(FetchedArtifact {
                        status,
                        body: Vec::new(),
                    });
                }

                let body = response
                    .bytes()
                    .await
                    .map_err(|error| format!("failed to read response body: {error}"))?;

                Ok(FetchedArtifact {
                    status,
                    body: body.to_vec(),
                })
            })
        })
    }
}
