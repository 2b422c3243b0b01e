//! 聊天回复代理
//!
//! 把访客消息连同固定的 system prompt 转发到 OpenAI 兼容网关。
//! 网关未配置、请求失败或被限流时返回配置中的兜底回复。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace, warn};
use ureq::Agent;

use crate::config::ChatConfig;
use crate::errors::{Result, SitepulseError};

/// 单条消息长度上限（字符）
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// 聊天网关
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn complete(&self, system_prompt: &str, message: &str) -> anyhow::Result<String>;
}

/// 基于 ureq 的 HTTP 网关
pub struct HttpChatGateway {
    agent: Agent,
    url: String,
    api_key: String,
    model: String,
}

impl HttpChatGateway {
    pub fn new(config: &ChatConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();

        Self {
            agent,
            url: config.gateway_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// 同步请求，在 spawn_blocking 中调用
    fn complete_sync(
        agent: Agent,
        url: String,
        api_key: String,
        body: serde_json::Value,
    ) -> anyhow::Result<String> {
        let mut request = agent.post(&url);
        if !api_key.is_empty() {
            request = request.header("Authorization", &format!("Bearer {}", api_key));
        }

        let response = match request.send_json(&body) {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(429)) => anyhow::bail!("gateway rate limited"),
            Err(e) => anyhow::bail!("gateway request failed: {}", e),
        };

        let json: serde_json::Value = response
            .into_body()
            .read_json()
            .map_err(|e| anyhow::anyhow!("gateway response unreadable: {}", e))?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("gateway response has no reply content"))
    }
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn complete(&self, system_prompt: &str, message: &str) -> anyhow::Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": message },
            ],
        });

        let agent = self.agent.clone();
        let url = self.url.clone();
        let api_key = self.api_key.clone();

        tokio::task::spawn_blocking(move || Self::complete_sync(agent, url, api_key, body))
            .await
            .map_err(|e| anyhow::anyhow!("chat request task failed: {}", e))?
    }
}

/// 聊天回复
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    /// 是否为兜底回复
    pub fallback: bool,
}

/// 聊天服务
#[derive(Clone)]
pub struct ChatService {
    gateway: Option<Arc<dyn ChatGateway>>,
    system_prompt: String,
    fallback_reply: String,
}

impl ChatService {
    pub fn new(
        gateway: Option<Arc<dyn ChatGateway>>,
        system_prompt: impl Into<String>,
        fallback_reply: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            system_prompt: system_prompt.into(),
            fallback_reply: fallback_reply.into(),
        }
    }

    /// gateway_url 为空时不创建网关
    pub fn from_config(config: &ChatConfig) -> Self {
        let gateway = if config.gateway_url.is_empty() {
            debug!("ChatService: no gateway configured, replies use the fallback text");
            None
        } else {
            Some(Arc::new(HttpChatGateway::new(config)) as Arc<dyn ChatGateway>)
        };
        Self::new(gateway, &config.system_prompt, &config.fallback_reply)
    }

    /// 校验消息：去掉首尾空白，不能为空，不能过长
    pub fn validate_message(message: &str) -> Result<&str> {
        let message = message.trim();
        if message.is_empty() {
            return Err(SitepulseError::validation("message must not be empty"));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(SitepulseError::validation(format!(
                "message exceeds {} characters",
                MAX_MESSAGE_CHARS
            )));
        }
        Ok(message)
    }

    /// 生成回复，任何网关错误都转成兜底回复
    pub async fn reply(&self, message: &str) -> Result<ChatReply> {
        let message = Self::validate_message(message)?;

        let Some(gateway) = &self.gateway else {
            return Ok(self.fallback());
        };

        match gateway.complete(&self.system_prompt, message).await {
            Ok(reply) => {
                trace!("ChatService: gateway replied with {} chars", reply.len());
                Ok(ChatReply {
                    reply,
                    fallback: false,
                })
            }
            Err(e) => {
                warn!("ChatService: {}, using fallback reply", e);
                Ok(self.fallback())
            }
        }
    }

    fn fallback(&self) -> ChatReply {
        ChatReply {
            reply: self.fallback_reply.clone(),
            fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGateway(anyhow::Result<String>);

    #[async_trait]
    impl ChatGateway for FixedGateway {
        async fn complete(&self, system_prompt: &str, message: &str) -> anyhow::Result<String> {
            assert_eq!(system_prompt, "be brief");
            assert_eq!(message, "How much is a website?");
            match &self.0 {
                Ok(reply) => Ok(reply.clone()),
                Err(e) => Err(anyhow::anyhow!("{}", e)),
            }
        }
    }

    fn service(result: anyhow::Result<String>) -> ChatService {
        ChatService::new(
            Some(Arc::new(FixedGateway(result)) as Arc<dyn ChatGateway>),
            "be brief",
            "Please use the contact form.",
        )
    }

    #[tokio::test]
    async fn test_gateway_reply_is_returned() {
        let reply = service(Ok("It depends on scope.".to_string()))
            .reply("  How much is a website?  ")
            .await
            .unwrap();
        assert_eq!(reply.reply, "It depends on scope.");
        assert!(!reply.fallback);
    }

    #[tokio::test]
    async fn test_gateway_error_uses_fallback() {
        let reply = service(Err(anyhow::anyhow!("gateway rate limited")))
            .reply("How much is a website?")
            .await
            .unwrap();
        assert_eq!(reply.reply, "Please use the contact form.");
        assert!(reply.fallback);
    }

    #[tokio::test]
    async fn test_without_gateway_uses_fallback() {
        let service = ChatService::from_config(&ChatConfig::default());
        let reply = service.reply("hello").await.unwrap();
        assert!(reply.fallback);
        assert_eq!(reply.reply, ChatConfig::default().fallback_reply);
    }

    #[tokio::test]
    async fn test_rejects_empty_and_oversized_messages() {
        let service = ChatService::new(None, "", "fallback");
        assert_eq!(service.reply("   ").await.unwrap_err().code(), "E005");
        let long = "x".repeat(MAX_MESSAGE_CHARS + 1);
        assert!(service.reply(&long).await.is_err());
    }
}
