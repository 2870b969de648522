//! User-facing strings for the two supported locales.

use std::fmt;

use serde::{Deserialize, Serialize};

/// UI language, also driving number formatting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fr => write!(f, "fr"),
            Self::En => write!(f, "en"),
        }
    }
}

/// Message catalogue for one locale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    fn pick(&self, fr: &'static str, en: &'static str) -> &'static str {
        match self.locale {
            Locale::Fr => fr,
            Locale::En => en,
        }
    }

    // -- generation panel ---------------------------------------------------

    pub fn generate_label(&self) -> &'static str {
        self.pick("Générer une position", "Generate a position")
    }

    pub fn copy_fen_label(&self) -> &'static str {
        self.pick("Copier la FEN", "Copy FEN")
    }

    pub fn copied(&self) -> &'static str {
        self.pick("Copié !", "Copied!")
    }

    pub fn inverted_range(&self) -> &'static str {
        self.pick(
            "La valeur minimale doit être inférieure à la valeur maximale.",
            "The minimum target must be lower than the maximum target.",
        )
    }

    pub fn not_an_integer(&self, field: &str) -> String {
        match self.locale {
            Locale::Fr => format!("Le champ « {field} » doit être un nombre entier."),
            Locale::En => format!("The \"{field}\" field must be a whole number."),
        }
    }

    pub fn generating(&self) -> &'static str {
        self.pick(
            "Génération en cours... Cela peut prendre jusqu'à 2 minutes.",
            "Generating... this can take up to 2 minutes.",
        )
    }

    pub fn generated(&self) -> &'static str {
        self.pick("Position générée avec succès !", "Position generated successfully!")
    }

    pub fn server_error(&self, error: &str) -> String {
        match self.locale {
            Locale::Fr => format!("Erreur : {error}"),
            Locale::En => format!("Error: {error}"),
        }
    }

    pub fn unknown_error(&self) -> &'static str {
        self.pick("Erreur inconnue", "Unknown error")
    }

    pub fn connection_error(&self, detail: &str) -> String {
        match self.locale {
            Locale::Fr => format!(
                "Erreur de connexion : {detail}. Vérifiez que le backend est bien lancé."
            ),
            Locale::En => format!(
                "Connection error: {detail}. Make sure the backend is running."
            ),
        }
    }

    pub fn copy_failed(&self, error: &str) -> String {
        match self.locale {
            Locale::Fr => format!("Erreur lors de la copie : {error}"),
            Locale::En => format!("Copy failed: {error}"),
        }
    }

    // -- navigation ---------------------------------------------------------

    pub fn login_label(&self) -> &'static str {
        self.pick("Connexion", "Log in")
    }

    pub fn logout_label(&self) -> &'static str {
        self.pick("Déconnexion", "Log out")
    }

    pub fn elo(&self, elo: f64) -> String {
        format!("ELO: {elo}")
    }

    pub fn confirm_logout(&self) -> &'static str {
        self.pick(
            "Voulez-vous vraiment vous déconnecter ?",
            "Do you really want to log out?",
        )
    }

    pub fn logout_failed(&self, error: &str) -> String {
        match self.locale {
            Locale::Fr => format!("Erreur lors de la déconnexion : {error}"),
            Locale::En => format!("Logout failed: {error}"),
        }
    }

    pub fn logout_connection_error(&self) -> &'static str {
        self.pick(
            "Erreur de connexion au serveur lors de la déconnexion.",
            "Could not reach the server to log out.",
        )
    }

    pub fn nav_page_label(&self, page: &str) -> &'static str {
        match page {
            "index.html" => self.pick("Générateur", "Generator"),
            "play.html" => self.pick("Jouer", "Play"),
            "profile.html" => self.pick("Profil", "Profile"),
            _ => "",
        }
    }
}
