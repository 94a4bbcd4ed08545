//! Default `Transport` backed by a ureq `Agent`.

use std::sync::OnceLock;

use ureq::http::{Request, Response};
use ureq::Agent;

use crate::config::TransportConfig;
use crate::error::Error;
use crate::http::{BodyStream, Proxy, Transport};

/// Blocking transport over ureq.
///
/// Status codes are never turned into errors: a 404 or 500 is a normal
/// response. Calls without a proxy share one agent and its connection pool;
/// a proxied call gets a fresh agent routed through that proxy.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    config: TransportConfig,
    agent: Agent,
}

impl UreqTransport {
    pub fn new(config: TransportConfig) -> Self {
        let agent = build_agent(&config, None);
        Self { config, agent }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn agent_for(&self, proxy: Option<&Proxy>) -> Agent {
        match proxy {
            Some(proxy) => build_agent(&self.config, Some(proxy)),
            None => self.agent.clone(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

fn build_agent(config: &TransportConfig, proxy: Option<&Proxy>) -> Agent {
    let builder = Agent::config_builder()
        .http_status_as_error(false)
        .user_agent(config.user_agent.as_str())
        .max_redirects(config.max_redirects);
    let builder = match proxy {
        Some(proxy) => builder.proxy(Some(proxy.as_ureq().clone())),
        None => builder,
    };
    builder.build().new_agent()
}

impl Transport for UreqTransport {
    fn send(
        &self,
        request: Request<Vec<u8>>,
        proxy: Option<&Proxy>,
    ) -> Result<Response<BodyStream>, Error> {
        let agent = self.agent_for(proxy);
        let (parts, body) = request.into_parts();
        // An empty body goes out as "no body" so GET/HEAD stay bodiless.
        let result = if body.is_empty() {
            agent.run(Request::from_parts(parts, ()))
        } else {
            agent.run(Request::from_parts(parts, body))
        };
        let response = result.map_err(|e| Error::Transport(Box::new(e)))?;
        let (parts, body) = response.into_parts();
        let stream: BodyStream = Box::new(body.into_reader());
        Ok(Response::from_parts(parts, stream))
    }
}

static DEFAULT_TRANSPORT: OnceLock<UreqTransport> = OnceLock::new();

/// Process-wide transport used by `Request::execute`, built once from
/// `TransportConfig::from_env`.
pub fn default_transport() -> &'static UreqTransport {
    DEFAULT_TRANSPORT.get_or_init(|| UreqTransport::new(TransportConfig::from_env()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transport_is_built_once() {
        let first = default_transport();
        let second = default_transport();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn keeps_its_config() {
        let config = TransportConfig {
            user_agent: "reqkit-test/1".to_string(),
            max_redirects: 0,
        };
        assert_eq!(UreqTransport::new(config.clone()).config(), &config);
    }
}
