use std::time::Duration;

use harvest_logging::harvest_debug;
use serde_json::{json, Value};
use url::Url;

use crate::dom::{DomUnitParser, UnitSelectors};
use crate::probe::{ContentProbe, ObstacleHandle, ObstaclePattern, ProbeError, RawUnit};

const SNAPSHOT_SCRIPT: &str = "return document.documentElement.outerHTML;";
const EXTENT_SCRIPT: &str = "return document.documentElement.scrollHeight;";
const SCROLL_TO_END_SCRIPT: &str = "window.scrollTo(0, document.documentElement.scrollHeight);";
const SCROLL_BY_SCRIPT: &str = "window.scrollBy(0, arguments[0]);";
const FIND_OBSTACLE_SCRIPT: &str = r#"
const [selector, text, token] = arguments;
for (const el of document.querySelectorAll(selector)) {
    if ((el.textContent || '').includes(text)) {
        el.setAttribute('data-harvest-obstacle', token);
        return token;
    }
}
return null;
"#;
const DISMISS_SCRIPT: &str = r#"
const el = document.querySelector('[data-harvest-obstacle="' + arguments[0] + '"]');
if (!el) {
    return false;
}
el.scrollIntoView({ block: 'center' });
el.click();
return true;
"#;

/// WebDriver error codes worth retrying on the same session.
const TRANSIENT_ERRORS: &[&str] = &[
    "stale element reference",
    "no such element",
    "element click intercepted",
    "script timeout",
    "timeout",
];

#[derive(Debug, Clone)]
pub struct WebDriverSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub selectors: UnitSelectors,
}

impl Default for WebDriverSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            selectors: UnitSelectors::default(),
        }
    }
}

/// Content probe speaking the W3C WebDriver protocol to an existing session.
///
/// Session creation and login happen elsewhere; this type only attaches to
/// the session id it is given.
pub struct WebDriverProbe {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
    session_url: Url,
    parser: DomUnitParser,
    obstacle_seq: u64,
}

impl WebDriverProbe {
    pub fn connect(
        base_url: &str,
        session_id: &str,
        settings: WebDriverSettings,
    ) -> Result<Self, ProbeError> {
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|err| ProbeError::Unavailable(format!("invalid webdriver url: {err}")))?;
        let session_url = base
            .join(&format!("session/{session_id}/"))
            .map_err(|err| ProbeError::Unavailable(format!("invalid session id: {err}")))?;

        let parser = DomUnitParser::new(&settings.selectors)
            .map_err(|err| ProbeError::Unavailable(err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ProbeError::Unavailable(err.to_string()))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| ProbeError::Unavailable(err.to_string()))?;

        Ok(Self {
            runtime,
            client,
            session_url,
            parser,
            obstacle_seq: 0,
        })
    }

    /// Points the session at a new page. Used between targets.
    pub fn navigate(&mut self, url: &str) -> Result<(), ProbeError> {
        self.command("url", json!({ "url": url }))?;
        Ok(())
    }

    fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, ProbeError> {
        self.command("execute/sync", json!({ "script": script, "args": args }))
    }

    fn command(&self, path: &str, body: Value) -> Result<Value, ProbeError> {
        let endpoint = self
            .session_url
            .join(path)
            .map_err(|err| ProbeError::Unavailable(err.to_string()))?;
        harvest_debug!("webdriver POST {}", endpoint);
        self.runtime
            .block_on(post_command(&self.client, endpoint, body))
    }

    fn snapshot(&self) -> Result<Vec<RawUnit>, ProbeError> {
        let html = self.execute(SNAPSHOT_SCRIPT, Vec::new())?;
        let html = html
            .as_str()
            .ok_or_else(|| ProbeError::Transient("page snapshot was not a string".into()))?;
        Ok(self.parser.parse(html))
    }
}

impl ContentProbe for WebDriverProbe {
    fn current_units(&mut self) -> Result<Vec<RawUnit>, ProbeError> {
        self.snapshot()
    }

    fn focal_unit(&mut self) -> Result<Option<RawUnit>, ProbeError> {
        Ok(self.snapshot()?.into_iter().next())
    }

    fn scroll_extent(&mut self) -> Result<u64, ProbeError> {
        let value = self.execute(EXTENT_SCRIPT, Vec::new())?;
        value
            .as_u64()
            .or_else(|| value.as_f64().filter(|v| *v >= 0.0).map(|v| v.round() as u64))
            .ok_or_else(|| ProbeError::Transient(format!("unexpected scroll extent {value}")))
    }

    fn advance(&mut self, amount: Option<u64>) -> Result<(), ProbeError> {
        match amount {
            Some(pixels) => self.execute(SCROLL_BY_SCRIPT, vec![json!(pixels)])?,
            None => self.execute(SCROLL_TO_END_SCRIPT, Vec::new())?,
        };
        Ok(())
    }

    fn find_transient_obstacle(
        &mut self,
        patterns: &[ObstaclePattern],
    ) -> Result<Option<ObstacleHandle>, ProbeError> {
        for pattern in patterns {
            self.obstacle_seq += 1;
            let token = format!("obstacle-{}", self.obstacle_seq);
            let found = self.execute(
                FIND_OBSTACLE_SCRIPT,
                vec![json!(pattern.selector), json!(pattern.text), json!(token)],
            )?;
            if found.as_str() == Some(token.as_str()) {
                return Ok(Some(ObstacleHandle {
                    label: pattern.label.clone(),
                    token,
                }));
            }
        }
        Ok(None)
    }

    fn dismiss(&mut self, handle: &ObstacleHandle) -> Result<bool, ProbeError> {
        let clicked = self.execute(DISMISS_SCRIPT, vec![json!(handle.token)])?;
        Ok(clicked.as_bool().unwrap_or(false))
    }

    fn refresh(&mut self) -> Result<(), ProbeError> {
        self.command("refresh", json!({}))?;
        Ok(())
    }
}

async fn post_command(client: &reqwest::Client, endpoint: Url, body: Value) -> Result<Value, ProbeError> {
    let response = client
        .post(endpoint)
        .json(&body)
        .send()
        .await
        .map_err(map_reqwest_error)?;
    let status = response.status();
    let payload: Value = response.json().await.map_err(map_reqwest_error)?;
    let value = payload.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }
    Err(map_webdriver_error(status.as_u16(), &value))
}

fn map_webdriver_error(status: u16, value: &Value) -> ProbeError {
    let code = value.get("error").and_then(Value::as_str).unwrap_or("unknown error");
    let message = value.get("message").and_then(Value::as_str).unwrap_or_default();
    let description = format!("{code} (http {status}): {message}");
    if TRANSIENT_ERRORS.contains(&code) {
        ProbeError::Transient(description)
    } else {
        ProbeError::Unavailable(description)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ProbeError {
    if err.is_timeout() {
        return ProbeError::Transient(err.to_string());
    }
    ProbeError::Unavailable(err.to_string())
}
