//! Server-rendered document shell.
//!
//! Produces the HTML frame every page renders inside: metadata, font
//! install, theme variables, and the session-gated header slot. Signed-out
//! requests get a sign-in affordance in the header; signed-in requests get
//! nothing in that slot.

use crate::config::Config;
use crate::session::SessionState;

/// IBM Plex Sans in the weights the shell uses.
const FONT_STYLESHEET: &str =
    "https://fonts.googleapis.com/css2?family=IBM+Plex+Sans:wght@400;500;600;700&display=swap";

const CSS: &str = "\
body {
    margin: 0;
    font-family: var(--font-ibm-plex);
    -webkit-font-smoothing: antialiased;
    -moz-osx-font-smoothing: grayscale;
}

header {
    display: flex;
    justify-content: flex-end;
    padding: 16px 24px;
}

.sign-in-button {
    display: inline-block;
    padding: 8px 20px;
    border-radius: 6px;
    background: var(--color-primary);
    color: #fff;
    font-weight: 600;
    text-decoration: none;
}";

/// Render the document shell around `children`.
#[must_use]
pub fn document(
    config: &Config,
    session: SessionState,
    sign_in_url: &str,
    children: &str,
) -> String {
    let header_slot = match session {
        SessionState::SignedOut => sign_in_button(sign_in_url),
        SessionState::SignedIn => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Imaginify</title>
    <meta name="description" content="AI-powered image generator">
    <link rel="preconnect" href="https://fonts.googleapis.com">
    <link rel="stylesheet" href="{font}">
    <style>
:root {{
    --font-ibm-plex: 'IBM Plex Sans', sans-serif;
    --color-primary: {accent};
}}
{css}
    </style>
</head>
<body class="antialiased">
    <header>{header_slot}</header>
    {children}
</body>
</html>"#,
        font = FONT_STYLESHEET,
        accent = config.theme_color_primary,
        css = CSS,
    )
}

fn sign_in_button(sign_in_url: &str) -> String {
    format!(r#"<a class="sign-in-button" href="{sign_in_url}">Sign in</a>"#)
}
