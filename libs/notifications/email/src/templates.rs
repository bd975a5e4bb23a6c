//! Built-in email templates rendered with Handlebars.
//!
//! Subjects and text bodies go through a registry without HTML escaping;
//! HTML bodies use the default escaping so customer input (names, comments)
//! cannot inject markup.

use handlebars::Handlebars;
use serde_json::Value;

use crate::error::{NotificationError, NotificationResult};

pub const WELCOME: &str = "welcome";
pub const ORDER_CONFIRMATION: &str = "order_confirmation";
pub const ORDER_STATUS: &str = "order_status";
pub const PAYMENT_RECEIPT: &str = "payment_receipt";
pub const BOOKING_CONFIRMATION: &str = "booking_confirmation";
pub const PASSWORD_RESET: &str = "password_reset";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
}

#[derive(Clone, Debug)]
pub struct EmailTemplate {
    pub name: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
}

pub struct TemplateEngine {
    plain: Handlebars<'static>,
    html: Handlebars<'static>,
    names: Vec<String>,
}

impl TemplateEngine {
    /// Engine with every built-in template registered
    pub fn new() -> NotificationResult<Self> {
        let mut plain = Handlebars::new();
        plain.register_escape_fn(handlebars::no_escape);

        let mut engine = Self {
            plain,
            html: Handlebars::new(),
            names: Vec::new(),
        };
        for template in builtin_templates() {
            engine.register(template)?;
        }
        Ok(engine)
    }

    pub fn register(&mut self, template: EmailTemplate) -> NotificationResult<()> {
        let name = &template.name;
        self.plain
            .register_template_string(&format!("{name}_subject"), &template.subject)
            .map_err(|e| NotificationError::Template(format!("{name} subject: {e}")))?;
        self.plain
            .register_template_string(&format!("{name}_text"), &template.body_text)
            .map_err(|e| NotificationError::Template(format!("{name} text: {e}")))?;
        self.html
            .register_template_string(&format!("{name}_html"), &template.body_html)
            .map_err(|e| NotificationError::Template(format!("{name} html: {e}")))?;

        if !self.has_template(name) {
            self.names.push(template.name.clone());
        }
        Ok(())
    }

    pub fn render(&self, name: &str, data: &Value) -> NotificationResult<RenderedTemplate> {
        if !self.has_template(name) {
            return Err(NotificationError::Template(format!(
                "Template not found: {name}"
            )));
        }

        let render = |registry: &Handlebars<'static>, part: &str| {
            registry
                .render(&format!("{name}_{part}"), data)
                .map_err(|e| NotificationError::Template(format!("{name} {part}: {e}")))
        };

        Ok(RenderedTemplate {
            subject: render(&self.plain, "subject")?.trim().to_string(),
            body_text: render(&self.plain, "text")?,
            body_html: render(&self.html, "html")?,
        })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn list_templates(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }
}

fn layout(heading: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h1 style="color: #b45309;">{heading}</h1>
{content}
    <p>See you soon,<br>The {{{{app_name}}}} Team</p>
</body>
</html>"#
    )
}

fn builtin_templates() -> Vec<EmailTemplate> {
    let signature = "\n\nSee you soon,\nThe {{app_name}} Team";
    let template = |name: &str, subject: &str, text: &str, heading: &str, html: &str| EmailTemplate {
        name: name.to_string(),
        subject: subject.to_string(),
        body_text: format!("{text}{signature}"),
        body_html: layout(heading, html),
    };

    vec![
        template(
            WELCOME,
            "Welcome to {{app_name}}, {{name}}!",
            r#"Hello {{name}},

Thanks for joining {{app_name}}. You can now order from our menu, book a table and leave reviews."#,
            "Welcome, {{name}}!",
            r#"    <p>Thanks for joining <strong>{{app_name}}</strong>.</p>
    <p>You can now order from our menu, book a table and leave reviews.</p>"#,
        ),
        template(
            ORDER_CONFIRMATION,
            "Order #{{order_ref}} confirmed",
            r#"Hello {{name}},

We received your order #{{order_ref}}:
{{#each items}}
  {{quantity}} x {{name}}  {{line_total}}
{{/each}}
Total: {{total}}

We'll let you know once it is paid and on its way."#,
            "Order #{{order_ref}} confirmed",
            r#"    <p>Hello {{name}}, we received your order:</p>
    <table style="border-collapse: collapse;">
        {{#each items}}
        <tr>
            <td style="padding: 4px 12px 4px 0;">{{quantity}} &times; {{name}}</td>
            <td style="padding: 4px 0; text-align: right;">{{line_total}}</td>
        </tr>
        {{/each}}
        <tr>
            <td style="padding: 8px 12px 0 0;"><strong>Total</strong></td>
            <td style="padding: 8px 0 0; text-align: right;"><strong>{{total}}</strong></td>
        </tr>
    </table>
    <p>We'll let you know once it is paid and on its way.</p>"#,
        ),
        template(
            ORDER_STATUS,
            "Order #{{order_ref}} is now {{status}}",
            r#"Hello {{name}},

Your order #{{order_ref}} changed from {{previous_status}} to {{status}}.
Order total: {{total}}"#,
            "Order #{{order_ref}} update",
            r#"    <p>Hello {{name}},</p>
    <p>Your order changed from <strong>{{previous_status}}</strong> to <strong>{{status}}</strong>.</p>
    <p>Order total: {{total}}</p>"#,
        ),
        template(
            PAYMENT_RECEIPT,
            "Payment receipt for order #{{order_ref}}",
            r#"Hello,

We received your payment of {{amount}} for order #{{order_ref}} on {{paid_at}}.
Payment reference: {{payment_id}}"#,
            "Payment received",
            r#"    <p>We received your payment of <strong>{{amount}}</strong> for order #{{order_ref}} on {{paid_at}}.</p>
    <p style="color: #666; font-size: 14px;">Payment reference: {{payment_id}}</p>"#,
        ),
        template(
            BOOKING_CONFIRMATION,
            "Your table on {{date}}",
            r#"Hello {{name}},

Your booking #{{booking_ref}} is in:
  Zone: {{zone}}
  When: {{date}} at {{time}}
  Guests: {{guests}}
{{#if hookahs_count}}  Hookahs pre-ordered: {{hookahs_count}}
{{/if}}
We'll confirm it shortly."#,
            "Table booked",
            r#"    <p>Hello {{name}}, your booking #{{booking_ref}} is in.</p>
    <ul>
        <li>Zone: {{zone}}</li>
        <li>When: {{date}} at {{time}}</li>
        <li>Guests: {{guests}}</li>
        {{#if hookahs_count}}<li>Hookahs pre-ordered: {{hookahs_count}}</li>{{/if}}
    </ul>
    <p>We'll confirm it shortly.</p>"#,
        ),
        template(
            PASSWORD_RESET,
            "Reset your {{app_name}} password",
            r#"Hello {{name}},

We received a request to reset your password. Use the link below:

{{reset_link}}

The link expires at {{expires_at}}. If you didn't request this, ignore this email."#,
            "Password reset",
            r#"    <p>Hello {{name}},</p>
    <p>We received a request to reset your password.</p>
    <p style="text-align: center; margin: 30px 0;">
        <a href="{{{reset_link}}}"
           style="background-color: #dc2626; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; display: inline-block;">
            Reset Password
        </a>
    </p>
    <p style="color: #666; font-size: 14px;">The link expires at {{expires_at}}. If you didn't request this, ignore this email.</p>"#,
        ),
    ]
}
