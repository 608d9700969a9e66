/// One credential slot as it arrived on the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Value(String),
    /// Present, but not decodable as a credential (non-UTF-8 bytes, a
    /// non-Bearer `Authorization` scheme). Fails resolution; never "absent".
    Unreadable,
}

impl Credential {
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Credential::Value(v) => Some(v),
            Credential::Unreadable => None,
        }
    }
}

/// Credentials attached to one inbound request.
///
/// Each credential is independently present or absent. Blank values are
/// normalized to absent at construction so the resolver never has to ask
/// "present but empty?".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialBundle {
    api_key: Option<Credential>,
    bearer_token: Option<Credential>,
    session_cookie: Option<Credential>,
}

fn non_blank(value: Option<Credential>) -> Option<Credential> {
    match value? {
        Credential::Value(v) => {
            let v = v.trim();
            (!v.is_empty()).then(|| Credential::Value(v.to_string()))
        }
        Credential::Unreadable => Some(Credential::Unreadable),
    }
}

impl CredentialBundle {
    pub fn new(
        api_key: Option<String>,
        bearer_token: Option<String>,
        session_cookie: Option<String>,
    ) -> Self {
        Self::from_slots(
            api_key.map(Credential::Value),
            bearer_token.map(Credential::Value),
            session_cookie.map(Credential::Value),
        )
    }

    pub fn from_slots(
        api_key: Option<Credential>,
        bearer_token: Option<Credential>,
        session_cookie: Option<Credential>,
    ) -> Self {
        Self {
            api_key: non_blank(api_key),
            bearer_token: non_blank(bearer_token),
            session_cookie: non_blank(session_cookie),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = non_blank(Some(Credential::Value(key.into())));
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = non_blank(Some(Credential::Value(token.into())));
        self
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = non_blank(Some(Credential::Value(cookie.into())));
        self
    }

    pub fn api_key_slot(&self) -> Option<&Credential> {
        self.api_key.as_ref()
    }

    pub fn bearer_token_slot(&self) -> Option<&Credential> {
        self.bearer_token.as_ref()
    }

    pub fn session_cookie_slot(&self) -> Option<&Credential> {
        self.session_cookie.as_ref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().and_then(Credential::as_value)
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_ref().and_then(Credential::as_value)
    }

    pub fn session_cookie(&self) -> Option<&str> {
        self.session_cookie.as_ref().and_then(Credential::as_value)
    }

    pub fn is_empty(&self) -> bool {
        self.api_key.is_none() && self.bearer_token.is_none() && self.session_cookie.is_none()
    }
}
