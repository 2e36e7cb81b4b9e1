//! Handlebars rendering of the generated PHP files

use super::{DatabaseCredentials, PLUGIN_NAME};
use handlebars::Handlebars;
use std::collections::HashMap;
use thiserror::Error;

/// Template name of the generated `config.inc.php`
pub const SITE_CONFIG_TEMPLATE: &str = "config.inc.php";

/// Template name of the plugin reactivation bootstrap script
pub const BOOTSTRAP_TEMPLATE: &str = "reactivate_restful.php";

/// Template system errors
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template registration error: {source}")]
    RegistrationError {
        #[from]
        source: Box<handlebars::TemplateError>,
    },

    #[error("Failed to render template '{name}': {message}")]
    RenderError { name: String, message: String },
}

/// Renders the files generated into the extracted tree.
///
/// Templates are embedded at compile time and use `{{VARIABLE}}`
/// placeholders. Output is never HTML-escaped and every placeholder must
/// have a value.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
    variables: HashMap<String, String>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self, TemplateError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars
            .register_template_string(
                SITE_CONFIG_TEMPLATE,
                include_str!("../../templates/site/config.inc.php.hbs"),
            )
            .map_err(Box::new)?;
        handlebars
            .register_template_string(
                BOOTSTRAP_TEMPLATE,
                include_str!("../../templates/site/reactivate_restful.php.hbs"),
            )
            .map_err(Box::new)?;

        let mut engine = Self {
            handlebars,
            variables: HashMap::new(),
        };
        engine.set_variable("PLUGIN_CLASS", format!("{PLUGIN_NAME}_Plugin"));
        Ok(engine)
    }

    /// Set template variable for substitution
    pub fn set_variable<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.variables.insert(key.into(), value.into());
    }

    /// Set the four database placeholders of the site config
    pub fn set_credentials(&mut self, credentials: &DatabaseCredentials) {
        self.set_variable("HOST", credentials.host.as_str());
        self.set_variable("USER", credentials.user.as_str());
        self.set_variable("PASSWORD", credentials.password.as_str());
        self.set_variable("DATABASE", credentials.database.as_str());
    }

    /// Render named template with current variables
    pub fn render_template(&self, template_name: &str) -> Result<String, TemplateError> {
        self.handlebars
            .render(template_name, &self.variables)
            .map_err(|e| TemplateError::RenderError {
                name: template_name.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    include!("templates.test.rs");
}
