// ============================================================
//  error.rs - Erorile de configurare ale șablonului de linie
// ============================================================
//
//  Restul aplicației folosește `anyhow::Result`. Compilatorul de
//  șabloane are însă o listă finită de eșecuri, așa că le modelăm
//  cu un enum `thiserror` - testele pot face `matches!` pe variantă.
// ============================================================

/// Eșecurile posibile la compilarea unui șablon `%{...}`.
///
/// Toate sunt erori de configurare: apar o singură dată, la pornire,
/// înainte de citirea primei linii din log.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// `%{` fără `}` de închidere
    #[error("placeholder neînchis la poziția {position} în șablon")]
    Unterminated { position: usize },

    /// `%{}`
    #[error("placeholder fără nume la poziția {position} în șablon")]
    EmptyName { position: usize },

    /// Aceeași componentă de timp apare de mai multe ori
    #[error(
        "componenta de timp '%{{{name}}}' apare de {count} ori; \
         folosiți %{{m}} pentru lună și %{{M}} pentru minut"
    )]
    RepeatedTimeField { name: String, count: usize },

    /// Pattern-ul rezultat nu a putut fi compilat
    #[error("șablonul a produs un pattern invalid: {0}")]
    Regex(#[from] regex::Error),
}
