//! Plesk XML API 请求方法

use crate::error::{PanelError, PayloadFormat, Result};
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};

use super::xml::packet;
use super::{AGENT_PATH, PleskProvider, XmlNode};

impl PleskProvider {
    /// Send one operator packet and return the `<result>` elements of its
    /// operation, failing on the first result whose status is not `ok`.
    pub(crate) async fn call(&self, operator: XmlNode, ctx: ErrorContext) -> Result<Vec<XmlNode>> {
        let operator_name = operator.name.clone();
        let operation = operator
            .children
            .first()
            .map(|op| op.name.clone())
            .unwrap_or_default();

        let body = self.http.post_xml(AGENT_PATH, packet(&operator)).await?;
        let mut root =
            XmlNode::parse(&body).map_err(|e| self.parse_error(PayloadFormat::Xml, e))?;

        // 认证失败等系统级错误：<packet><system><status>error</status>...</system></packet>
        if let Some(system) = root.child("system") {
            return Err(self.result_error(system, ctx));
        }

        let mut op = root
            .take_child(&operator_name)
            .and_then(|mut o| o.take_child(&operation))
            .ok_or_else(|| {
                self.parse_error(
                    PayloadFormat::Xml,
                    format!("response has no <{operator_name}><{operation}> element"),
                )
            })?;
        // <mail><update><set><result>
        while op.children.len() == 1 && op.child("result").is_none() {
            let inner = op.children.remove(0);
            op = inner;
        }

        let results: Vec<XmlNode> = std::mem::take(&mut op.children)
            .into_iter()
            .filter(|c| c.name == "result")
            .collect();
        if let Some(failed) = results.iter().find(|r| r.text_at(&["status"]) != "ok") {
            log::error!(
                "[{}] {operator_name}/{operation} failed: {}",
                self.panel_name(),
                failed.text_at(&["errtext"])
            );
            return Err(self.result_error(failed, ctx));
        }
        Ok(results)
    }

    /// Like [`call`](Self::call), for operations answering a single result.
    pub(crate) async fn call_one(&self, operator: XmlNode, ctx: ErrorContext) -> Result<XmlNode> {
        self.call(operator, ctx)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| self.parse_error(PayloadFormat::Xml, "response has no <result>"))
    }

    fn result_error(&self, node: &XmlNode, ctx: ErrorContext) -> PanelError {
        let code = node.text_at(&["errcode"]);
        let text = node.text_at(&["errtext"]);
        let message = if text.is_empty() {
            "Plesk reported an error".to_string()
        } else {
            text.to_string()
        };
        let raw = if code.is_empty() {
            RawApiError::new(message)
        } else {
            RawApiError::with_code(code, message)
        };
        self.map_error(raw, ctx)
    }
}

/// `<operator><operation>...children...</operation></operator>`
pub(crate) fn request(operator: &str, operation: &str, children: Vec<XmlNode>) -> XmlNode {
    XmlNode::new(operator).with(XmlNode::new(operation).with_all(children))
}

/// `<filter><key>value</key></filter>`
pub(crate) fn filter(key: &str, value: &str) -> XmlNode {
    XmlNode::new("filter").with_text(key, value)
}
