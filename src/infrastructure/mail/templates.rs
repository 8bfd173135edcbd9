use chrono::{DateTime, Utc};

use crate::{entities::message::ContactForm, mail::mailer::OutgoingEmail, utils::render::escape_html};

pub fn admin_notification(to: &str, form: &ContactForm, received_at: DateTime<Utc>) -> OutgoingEmail {
    let name = escape_html(&form.name);
    let email = escape_html(&form.email);
    let message = escape_html(&form.message);
    let subject_line = form
        .subject
        .as_deref()
        .map(|s| format!(r#"<p style="margin: 8px 0;"><strong>Subject:</strong> {}</p>"#, escape_html(s)))
        .unwrap_or_default();
    let received = received_at.format("%A, %B %-d, %Y at %H:%M UTC");

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background: #667eea; border-radius: 15px;">
  <div style="background: white; padding: 30px; border-radius: 10px;">
    <h2 style="color: #333; border-bottom: 3px solid #667eea; padding-bottom: 10px;">New Portfolio Contact Message</h2>
    <div style="background: #f8f9ff; padding: 20px; border-radius: 8px; margin: 20px 0;">
      <h3 style="color: #667eea; margin-top: 0;">Contact Details</h3>
      <p style="margin: 8px 0;"><strong>Name:</strong> {name}</p>
      <p style="margin: 8px 0;"><strong>Email:</strong> <a href="mailto:{email}" style="color: #667eea;">{email}</a></p>
      {subject_line}
    </div>
    <div style="background: #fff8f0; padding: 20px; border-radius: 8px; border-left: 4px solid #ffa726;">
      <h3 style="color: #f57c00; margin-top: 0;">Message</h3>
      <p style="line-height: 1.6; color: #333; white-space: pre-wrap;">{message}</p>
    </div>
    <p style="color: #666; font-size: 14px; text-align: center; margin-top: 30px;">Received on {received}</p>
  </div>
</div>"#
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: format!("New Portfolio Contact Message from {}", form.name),
        html,
    }
}

pub fn thank_you(form: &ContactForm, owner_name: &str) -> OutgoingEmail {
    let name = escape_html(&form.name);
    let owner = escape_html(owner_name);

    let html = format!(
        r#"<div style="font-family: 'Segoe UI', Tahoma, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background: #74b9ff; border-radius: 15px;">
  <div style="background: white; padding: 40px; border-radius: 12px;">
    <h1 style="color: #2d3436; text-align: center; font-weight: 300;">Thank You, {name}!</h1>
    <p style="color: #636e72; line-height: 1.8; font-size: 16px;">
      I appreciate you taking the time to reach out through my portfolio. Your message has been received
      and you can expect a personal response within 24-48 hours.
    </p>
    <p style="color: #636e72; line-height: 1.6; font-size: 16px;">In the meantime, feel free to explore my other projects.</p>
    <div style="text-align: center; margin-top: 35px; padding-top: 25px; border-top: 2px solid #ddd;">
      <p style="color: #74b9ff; font-weight: 600; margin-bottom: 5px;">Best regards,</p>
      <p style="color: #2d3436; font-size: 18px; margin: 0;">{owner}</p>
    </div>
    <p style="color: #b2bec3; font-size: 12px; text-align: center;">This is an automated response. Please don't reply to this email.</p>
  </div>
</div>"#
    );

    OutgoingEmail {
        to: form.email.clone(),
        subject: format!("Thank you for reaching out, {}!", form.name),
        html,
    }
}
