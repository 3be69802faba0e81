//! Fixed markup and script text spliced into the target document.

/// Greeting card shown on the home screen once the visitor has identified.
pub const GREETING_MARKUP: &str = r#"
        <!-- Saludo personalizado del usuario (se muestra después de identificarse) -->
        <div class="user-greeting" id="user-greeting" style="display: none;">
            <div class="user-greeting-text">¡Hola, <span id="greeting-name"></span>!</div>
            <div class="user-greeting-subtitle">Tu código de identificación</div>
            <div class="user-code-badge" id="greeting-code"></div>
            <button class="logout-btn" onclick="logout()" style="position: static; margin-top: 15px;">
                🚪 Cerrar sesión
            </button>
        </div>
"#;

/// Session-dependent greeting that used to pop an `alert` dialog.
pub const GREETING_ALERT: &str = r#"        // Mostrar saludo personalizado
        function showUserGreeting() {
            const userName = localStorage.getItem('userName');
            const userCode = localStorage.getItem('attendeeCode');

            if (userName) {
                alert(`¡Perfecto! Sistema implementado.\n\nUsuario: ${userName}\nCódigo: ${userCode}\n\nEste saludo se mostrará en el home screen.`);
            }
        }"#;

/// Same greeting written into the home-screen card instead.
pub const GREETING_INLINE: &str = r#"        // Mostrar saludo personalizado
        function showUserGreeting() {
            const userName = localStorage.getItem('userName');
            const userCode = localStorage.getItem('attendeeCode');

            if (userName) {
                const greetingDiv = document.getElementById('user-greeting');
                const greetingName = document.getElementById('greeting-name');
                const greetingCode = document.getElementById('greeting-code');

                if (greetingDiv && greetingName && greetingCode) {
                    greetingName.textContent = userName;
                    greetingCode.textContent = userCode;
                    greetingDiv.style.display = 'block';
                }
            }
        }"#;

/// Session check the welcome page ran from its own `window.onload`.
pub const ONLOAD_SESSION_CHECK: &str = r#"        // Verificar si ya hay sesión al cargar
        window.onload = function() {
            const userName = localStorage.getItem('userName');
            const userEmail = localStorage.getItem('userEmail');

            if (userName && userEmail) {
                // Mostrar botón de logout
                document.getElementById('logout-btn').style.display = 'block';

                // Cerrar overlay automáticamente
                setTimeout(() => {
                    closeWelcomeOverlay();
                }, 500);
            }
        };"#;

/// Session check as a callable function, invoked from the target's startup hook.
pub const CHECK_EXISTING_SESSION: &str = r#"        // Verificar si ya hay sesión existente
        function checkExistingSession() {
            const userName = localStorage.getItem('userName');
            const userEmail = localStorage.getItem('userEmail');

            if (userName && userEmail) {
                // Mostrar botón de logout en el overlay
                const logoutBtn = document.getElementById('logout-btn');
                if (logoutBtn) {
                    logoutBtn.style.display = 'block';
                }

                // Cerrar overlay automáticamente
                setTimeout(() => {
                    closeWelcomeOverlay();
                }, 500);
            }
        }"#;

/// A literal find-and-replace applied to the welcome script before it is
/// spliced into the target.
#[derive(Debug, Clone, Copy)]
pub struct Rewrite {
    pub name: &'static str,
    pub from: &'static str,
    pub to: &'static str,
}

pub const SCRIPT_REWRITES: [Rewrite; 2] = [
    Rewrite {
        name: "showUserGreeting",
        from: GREETING_ALERT,
        to: GREETING_INLINE,
    },
    Rewrite {
        name: "checkExistingSession",
        from: ONLOAD_SESSION_CHECK,
        to: CHECK_EXISTING_SESSION,
    },
];

/// Applies every rewrite in order, returning the new script and how many
/// times each rewrite matched.
pub fn adapt_script(script: &str) -> (String, Vec<(&'static str, usize)>) {
    let mut adapted = script.to_owned();
    let mut hits = Vec::with_capacity(SCRIPT_REWRITES.len());
    for rewrite in &SCRIPT_REWRITES {
        let count = adapted.matches(rewrite.from).count();
        if count > 0 {
            adapted = adapted.replace(rewrite.from, rewrite.to);
        }
        hits.push((rewrite.name, count));
    }
    (adapted, hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn welcome_script() -> String {
        format!(
            "        // Sistema de partículas animadas\n        const canvas = null;\n\n{GREETING_ALERT}\n\n{ONLOAD_SESSION_CHECK}\n"
        )
    }

    #[test]
    fn rewrites_both_blocks() {
        let (adapted, hits) = adapt_script(&welcome_script());
        assert_eq!(hits, vec![("showUserGreeting", 1), ("checkExistingSession", 1)]);
        assert!(!adapted.contains("alert("));
        assert!(!adapted.contains("window.onload"));
        assert!(adapted.contains("function checkExistingSession() {"));
        assert!(adapted.contains("greetingDiv.style.display = 'block';"));
        assert!(adapted.starts_with("        // Sistema de partículas animadas\n"));
    }

    #[test]
    fn rewriting_adapted_text_is_a_no_op() {
        let (once, _) = adapt_script(&welcome_script());
        let (twice, hits) = adapt_script(&once);
        assert_eq!(once, twice);
        assert_eq!(hits, vec![("showUserGreeting", 0), ("checkExistingSession", 0)]);
    }

    #[test]
    fn session_check_guards_missing_logout_button() {
        assert!(CHECK_EXISTING_SESSION.contains("if (logoutBtn) {"));
        assert!(CHECK_EXISTING_SESSION.contains("}, 500);"));
        assert!(ONLOAD_SESSION_CHECK.contains("document.getElementById('logout-btn').style"));
    }

    #[test]
    fn greeting_markup_carries_target_ids() {
        for id in ["user-greeting", "greeting-name", "greeting-code"] {
            assert!(GREETING_MARKUP.contains(&format!("id=\"{id}\"")));
            assert!(GREETING_INLINE.contains(&format!("getElementById('{id}')")));
        }
        assert!(GREETING_MARKUP.starts_with('\n'));
        assert!(GREETING_MARKUP.ends_with("</div>\n"));
    }
}
