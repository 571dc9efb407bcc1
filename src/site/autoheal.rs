//! Auto-heal rules
//!
//! A status-code trigger is written as either a single code (`500`) or a
//! range (`500-599`). The remote API keeps the two in separate lists.

use super::nested;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoHealSetting {
    pub action: AutoHealAction,
    #[serde(default)]
    pub trigger: AutoHealTrigger,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoHealAction {
    /// `Recycle`, `LogEvent` or `CustomAction`
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_process_execution_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoHealTrigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<RequestsTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slow_request: Option<SlowRequestTrigger>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status_codes: Vec<StatusCodeTrigger>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestsTrigger {
    pub count: i64,
    pub interval: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlowRequestTrigger {
    pub count: i64,
    pub interval: String,
    pub time_taken: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCodeTrigger {
    /// `500` or `500-599`
    pub status_code_range: String,
    pub count: i64,
    pub interval: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_status: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win32_status_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

pub fn expand_auto_heal(setting: &AutoHealSetting) -> nested::AutoHealRules {
    let trigger = &setting.trigger;

    let mut status_codes = Vec::new();
    let mut status_codes_range = Vec::new();
    for rule in &trigger.status_codes {
        match rule.status_code_range.trim().parse::<i64>() {
            Ok(status) => status_codes.push(nested::StatusCodesBasedTrigger {
                status: Some(status),
                sub_status: rule.sub_status,
                win32_status: rule.win32_status_code,
                path: rule.path.clone(),
                count: Some(rule.count),
                time_interval: Some(rule.interval.clone()),
            }),
            Err(_) => status_codes_range.push(nested::StatusCodesRangeBasedTrigger {
                status_codes: Some(rule.status_code_range.clone()),
                path: rule.path.clone(),
                count: Some(rule.count),
                time_interval: Some(rule.interval.clone()),
            }),
        }
    }

    nested::AutoHealRules {
        triggers: Some(nested::AutoHealTriggers {
            requests: trigger.requests.as_ref().map(|r| nested::RequestsBasedTrigger {
                count: Some(r.count),
                time_interval: Some(r.interval.clone()),
            }),
            slow_requests: trigger
                .slow_request
                .as_ref()
                .map(|s| nested::SlowRequestsBasedTrigger {
                    time_taken: Some(s.time_taken.clone()),
                    path: s.path.clone(),
                    count: Some(s.count),
                    time_interval: Some(s.interval.clone()),
                }),
            status_codes: (!status_codes.is_empty()).then_some(status_codes),
            status_codes_range: (!status_codes_range.is_empty()).then_some(status_codes_range),
        }),
        actions: Some(nested::AutoHealActions {
            action_type: Some(setting.action.action_type.clone()),
            min_process_execution_time: setting.action.minimum_process_execution_time.clone(),
        }),
    }
}

/// `None` unless auto-heal is enabled and has an action
pub fn flatten_auto_heal(enabled: Option<bool>, rules: Option<&nested::AutoHealRules>) -> Option<AutoHealSetting> {
    if !enabled.unwrap_or(false) {
        return None;
    }
    let rules = rules?;
    let actions = rules.actions.as_ref()?;

    let mut trigger = AutoHealTrigger::default();
    if let Some(triggers) = &rules.triggers {
        trigger.requests = triggers.requests.as_ref().map(|r| RequestsTrigger {
            count: r.count.unwrap_or_default(),
            interval: r.time_interval.clone().unwrap_or_default(),
        });
        trigger.slow_request = triggers.slow_requests.as_ref().map(|s| SlowRequestTrigger {
            count: s.count.unwrap_or_default(),
            interval: s.time_interval.clone().unwrap_or_default(),
            time_taken: s.time_taken.clone().unwrap_or_default(),
            path: s.path.clone(),
        });

        for code in triggers.status_codes.iter().flatten() {
            trigger.status_codes.push(StatusCodeTrigger {
                status_code_range: code.status.unwrap_or_default().to_string(),
                count: code.count.unwrap_or_default(),
                interval: code.time_interval.clone().unwrap_or_default(),
                sub_status: code.sub_status,
                win32_status_code: code.win32_status,
                path: code.path.clone(),
            });
        }
        for range in triggers.status_codes_range.iter().flatten() {
            trigger.status_codes.push(StatusCodeTrigger {
                status_code_range: range.status_codes.clone().unwrap_or_default(),
                count: range.count.unwrap_or_default(),
                interval: range.time_interval.clone().unwrap_or_default(),
                sub_status: None,
                win32_status_code: None,
                path: range.path.clone(),
            });
        }
    }

    Some(AutoHealSetting {
        action: AutoHealAction {
            action_type: actions.action_type.clone().unwrap_or_default(),
            minimum_process_execution_time: actions.min_process_execution_time.clone(),
        },
        trigger,
    })
}
