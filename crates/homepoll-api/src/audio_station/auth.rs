// Audio Station authentication
//
// `SYNO.API.Auth` login/logout. Login returns a session id (`sid`) that
// every remote-player call carries as `_sid`. DSM expects the credentials
// in the query string; they are redacted from logs but do travel in the
// request URL.

use secrecy::{ExposeSecret, SecretString};
use serde::de::IgnoredAny;
use tracing::{debug, info, warn};

use crate::audio_station::client::{AudioStationClient, SESSION_NAME};
use crate::audio_station::models::LoginData;
use crate::error::Error;

impl AudioStationClient {
    /// Authenticate and store the session id.
    ///
    /// `GET {base}/webapi/auth.cgi?api=SYNO.API.Auth&method=login&version=3&account={u}&passwd={p}&session=AudioStation&format=sid`
    ///
    /// Any previous session is discarded first, so a failed login leaves
    /// the client unauthenticated.
    pub async fn login(&mut self, username: &str, password: &SecretString) -> Result<(), Error> {
        if username.is_empty() {
            return Err(Error::MissingCredential("Audio Station username"));
        }

        self.session.clear();

        let url = self.auth_url(
            "login",
            &[
                ("account", username),
                ("passwd", password.expose_secret()),
                ("session", SESSION_NAME),
                ("format", "sid"),
            ],
        )?;

        debug!(username, "logging in");
        let data: LoginData = self.call(url).await?;
        if data.sid.is_empty() {
            return Err(Error::Deserialization {
                message: "login succeeded but returned an empty sid".into(),
                body: String::new(),
            });
        }

        self.session.set_sid(data.sid);
        info!(username, "logged in to Audio Station");
        Ok(())
    }

    /// End the current session.
    ///
    /// `GET {base}/webapi/auth.cgi?api=SYNO.API.Auth&method=logout&version=3&session=AudioStation&_sid={sid}`
    ///
    /// The local session is cleared even if the server call fails. A
    /// client that never logged in returns `Ok` without a request.
    pub async fn logout(&mut self) -> Result<(), Error> {
        let Some(sid) = self.session.sid().map(str::to_owned) else {
            debug!("logout skipped: no session");
            return Ok(());
        };

        let url = self.auth_url("logout", &[("session", SESSION_NAME), ("_sid", &sid)])?;
        self.session.clear();

        debug!("logging out");
        match self.call::<IgnoredAny>(url).await {
            Ok(_) => {
                debug!("logout complete");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "logout failed");
                Err(e)
            }
        }
    }
}
