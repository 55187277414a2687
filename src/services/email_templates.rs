use crate::models::ApplicationStatus;

/// Subject plus rendered bodies for one transactional email.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub template: &'static str,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Minimal HTML escaping for values interpolated into templates.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(logo_cid: &str, heading: &str, body: &str) -> String {
    format!(
        r#"
<!DOCTYPE html>
<html>
<head>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 0; padding: 0; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ text-align: center; padding: 20px; }}
        .content {{ padding: 20px; background-color: #f9f9f9; border: 1px solid #ddd; border-radius: 5px; }}
        .otp {{ font-size: 28px; letter-spacing: 6px; font-weight: bold; text-align: center; margin: 20px 0; }}
        .footer {{ padding: 10px; text-align: center; color: #666; font-size: 12px; }}
        .footer img {{ width: 24px; margin: 0 6px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <img src="cid:{}" alt="logo" style="max-height: 60px;" />
            <h2>{}</h2>
        </div>
        <div class="content">
            {}
        </div>
        <div class="footer">
            <img src="cid:iconFacebook" alt="Facebook" />
            <img src="cid:iconInstagram" alt="Instagram" />
            <img src="cid:iconLinkedin" alt="LinkedIn" />
            <p>This is an automated message from the Job Portal.</p>
        </div>
    </div>
</body>
</html>
"#,
        logo_cid, heading, body
    )
}

// ==============================================================================
// Account emails
// ==============================================================================

pub fn signup_otp(name: &str, otp: &str) -> RenderedEmail {
    let body = format!(
        "<p>Hi {},</p><p>Use the code below to verify your email address. It expires in 10 minutes.</p><div class=\"otp\">{}</div>",
        escape(name),
        escape(otp)
    );
    RenderedEmail {
        template: "signup",
        subject: "Verify your Email - Signup OTP".to_string(),
        html: layout("topLogo", "Verify your email", &body),
        text: format!("Hi {},\n\nYour verification code is {}. It expires in 10 minutes.", name, otp),
    }
}

pub fn password_reset_otp(name: &str, otp: &str) -> RenderedEmail {
    let body = format!(
        "<p>Hi {},</p><p>We received a request to reset your password. Use this code to continue:</p><div class=\"otp\">{}</div><p>If you did not request this, you can ignore this email.</p>",
        escape(name),
        escape(otp)
    );
    RenderedEmail {
        template: "forgot-password",
        subject: "Password Reset OTP".to_string(),
        html: layout("topLogo", "Reset your password", &body),
        text: format!("Hi {},\n\nYour password reset code is {}.", name, otp),
    }
}

// ==============================================================================
// Application lifecycle emails
// ==============================================================================

pub struct ApplicationContext<'a> {
    pub applicant_name: &'a str,
    pub job_title: &'a str,
    pub company_name: &'a str,
    pub careers_page: &'a str,
    pub support_email: &'a str,
}

pub fn application_created(ctx: &ApplicationContext<'_>) -> RenderedEmail {
    let body = format!(
        "<p>Dear {},</p><p>Thank you for applying for the <strong>{}</strong> position at <strong>{}</strong>. We have received your application and our team will review it shortly.</p><p>Explore more openings at <a href=\"{}\">our careers page</a>.</p>",
        escape(ctx.applicant_name),
        escape(ctx.job_title),
        escape(ctx.company_name),
        escape(ctx.careers_page)
    );
    RenderedEmail {
        template: "application-created",
        subject: format!("Application Received for {}", ctx.job_title),
        html: layout("companyLogo", "Application received", &body),
        text: format!(
            "Dear {},\n\nThank you for applying for the {} position at {}. We will review your application shortly.\n\n{}",
            ctx.applicant_name, ctx.job_title, ctx.company_name, ctx.careers_page
        ),
    }
}

pub fn application_deleted(ctx: &ApplicationContext<'_>) -> RenderedEmail {
    let body = format!(
        "<p>Dear {},</p><p>Your application for <strong>{}</strong> at <strong>{}</strong> has been deleted.</p><p>If you believe this is a mistake, contact us at <a href=\"mailto:{}\">{}</a>. You can browse other roles at <a href=\"{}\">our careers page</a>.</p>",
        escape(ctx.applicant_name),
        escape(ctx.job_title),
        escape(ctx.company_name),
        escape(ctx.support_email),
        escape(ctx.support_email),
        escape(ctx.careers_page)
    );
    RenderedEmail {
        template: "application-deleted",
        subject: format!("Application Deleted for {}", ctx.job_title),
        html: layout("companyLogo", "Application deleted", &body),
        text: format!(
            "Dear {},\n\nYour application for {} at {} has been deleted. Questions: {}",
            ctx.applicant_name, ctx.job_title, ctx.company_name, ctx.support_email
        ),
    }
}

/// Status-change email. Returns `None` for statuses that do not email the applicant.
pub fn application_status(
    status: ApplicationStatus,
    applicant_name: &str,
    job_title: &str,
    company_name: &str,
) -> Option<RenderedEmail> {
    let title = escape(job_title);
    let (subject, body, text) = match status {
        ApplicationStatus::Selected => (
            format!("🎉 Congratulations! You've been selected for {}", job_title),
            format!(
                "<p>We are pleased to inform you that you've been <strong>selected</strong> for the position of <strong>{}</strong>.</p><p>We'll follow up shortly with the next steps.</p><p>Thank you for your interest in joining us.</p>",
                title
            ),
            format!("You've been selected for the position of {}. We'll follow up shortly with the next steps.", job_title),
        ),
        ApplicationStatus::Rejected => (
            format!("Application Update: Rejected for {}", job_title),
            format!(
                "<p>Thank you for applying for the <strong>{}</strong> role.</p><p>After review, we regret to inform you that your application has been rejected.</p><p>We encourage you to apply for future openings.</p>",
                title
            ),
            format!("After review, your application for the {} role has been rejected.", job_title),
        ),
        ApplicationStatus::NotSelected => (
            format!("Application Status: Not Selected for {}", job_title),
            format!(
                "<p>We appreciate your interest in the <strong>{}</strong> position.</p><p>At this time, you have not been selected.</p><p>Thank you, and we wish you the best moving forward.</p>",
                title
            ),
            format!("At this time, you have not been selected for the {} position.", job_title),
        ),
        ApplicationStatus::Pending | ApplicationStatus::InProgress => return None,
    };

    let html = layout(
        "companyLogo",
        &escape(company_name),
        &format!("<p>Dear {},</p>{}", escape(applicant_name), body),
    );

    Some(RenderedEmail {
        template: "application-status",
        subject,
        html,
        text: format!("Dear {},\n\n{}\n\n{}", applicant_name, text, company_name),
    })
}
