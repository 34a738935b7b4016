use crate::models::NewUser;

/// Client for the registration endpoint. One operation, no retries, no
/// caching, no payload transformation; results come back raw so the form
/// controller can interpret them.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    sign_up_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        ApiClient {
            http: reqwest::Client::new(),
            sign_up_url: format!("{}/sign-up", base_url.trim_end_matches('/')),
        }
    }

    pub fn sign_up_url(&self) -> &str {
        &self.sign_up_url
    }

    /// POSTs the candidate as JSON. Transport failures and HTTP error
    /// statuses are propagated unchanged.
    pub async fn create_user(
        &self,
        user: &NewUser,
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.http.post(&self.sign_up_url).json(user).send().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_is_joined_without_doubled_slashes() {
        assert_eq!(
            ApiClient::new("http://localhost:9000").sign_up_url(),
            "http://localhost:9000/sign-up"
        );
        assert_eq!(
            ApiClient::new("http://localhost:9000/").sign_up_url(),
            "http://localhost:9000/sign-up"
        );
    }
}
