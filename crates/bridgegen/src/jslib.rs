//! `.jslib` emitter
//!
//! One `AppsInToss-{Category}.jslib` per category. Each API becomes a
//! `__{name}_Internal` function that decodes its arguments, calls into
//! `window.AppsInToss` and reports back through `SendMessage`.
//!
//! `__AITUnsubscribe_Internal` is defined exactly once across the set, in the
//! first category that has subscriptions (or the first category if none do),
//! since `AITCore.cs` always imports it.

use crate::csharp::{group_by_category, templates, PreparedApi, TemplateSet};
use crate::diagnostics::GenResult;
use crate::types::GeneratedFile;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JslibData<'a> {
    file_name: &'a str,
    category_name: &'a str,
    generator_name: &'a str,
    generator_version: &'a str,
    web_framework_tag: &'a str,
    apis: &'a [&'a PreparedApi],
    include_unsubscribe: bool,
}

pub fn jslib_file_name(category: &str) -> String {
    format!("AppsInToss-{}.jslib", category)
}

fn has_subscriptions(apis: &[&PreparedApi]) -> bool {
    apis.iter()
        .any(|api| api.is_event_subscription || api.is_callback_based)
}

/// Renders the jslib glue for every category
#[derive(Debug)]
pub struct JslibGenerator<'t> {
    templates: &'t TemplateSet,
    category_order: Vec<String>,
    web_framework_tag: String,
}

impl<'t> JslibGenerator<'t> {
    pub fn new(templates: &'t TemplateSet) -> Self {
        Self {
            templates,
            category_order: Vec::new(),
            web_framework_tag: "latest".to_string(),
        }
    }

    pub fn category_order(mut self, order: Vec<String>) -> Self {
        self.category_order = order;
        self
    }

    pub fn web_framework_tag(mut self, tag: impl Into<String>) -> Self {
        self.web_framework_tag = tag.into();
        self
    }

    pub fn generate(&self, apis: &[PreparedApi]) -> GenResult<Vec<GeneratedFile>> {
        let groups = group_by_category(apis, &self.category_order);
        let unsubscribe_owner = groups
            .iter()
            .position(|(_, members)| has_subscriptions(members))
            .unwrap_or(0);

        groups
            .iter()
            .enumerate()
            .map(|(index, (category, members))| {
                let file_name = jslib_file_name(category);
                let content = self.templates.render(
                    templates::JSLIB,
                    &JslibData {
                        file_name: &file_name,
                        category_name: category,
                        generator_name: crate::NAME,
                        generator_version: crate::VERSION,
                        web_framework_tag: &self.web_framework_tag,
                        apis: members,
                        include_unsubscribe: index == unsubscribe_owner,
                    },
                )?;
                tracing::debug!(file = %file_name, functions = members.len(), "rendered jslib");
                Ok(GeneratedFile::new(file_name, content))
            })
            .collect()
    }
}
