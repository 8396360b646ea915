//! Notification composer
//!
//! Renders the operator notification and requester confirmation for an
//! accepted submission. Inputs are already HTML-encoded, so field values are
//! embedded verbatim.

use crate::config::SiteConfig;
use crate::models::{ContactSubmission, DemoBookingRequest};

/// A rendered email, ready for the mail sender
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subject: String,
    pub html: String,
}

/// Operator notification and requester confirmation for one submission
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPair {
    pub operator: Notification,
    pub requester: Notification,
}

const STYLE: &str = "body { font-family: 'Poppins', Arial, sans-serif; line-height: 1.6; color: #2C3E50; }
.container { max-width: 600px; margin: 0 auto; padding: 20px; }
.header { background: linear-gradient(135deg, #D4A017, #B8860B); color: white; padding: 20px; text-align: center; border-radius: 10px 10px 0 0; }
.content { background: #f8f9fa; padding: 20px; border-radius: 0 0 10px 10px; }
.field { margin-bottom: 15px; }
.label { font-weight: bold; color: #D4A017; }
.value { margin-top: 5px; }
.booking-id { background: #D4A017; color: white; padding: 10px; text-align: center; border-radius: 5px; font-weight: bold; margin-bottom: 20px; }
.info-box { background: white; padding: 15px; border-left: 4px solid #D4A017; margin: 15px 0; }";

pub fn compose_contact(site: &SiteConfig, submission: &ContactSubmission) -> NotificationPair {
    let fields = [
        field("Nom complet", &submission.full_name()),
        field("Email", &submission.email),
        field("Téléphone", or_default(&submission.phone, "Non renseigné")),
        field("Sujet", &submission.subject),
        field("Message", &nl2br(&submission.message)),
        field("Newsletter", if submission.newsletter { "Oui" } else { "Non" }),
        field("Date", &submission.timestamp),
    ]
    .concat();

    let operator_title = format!("Nouveau message de contact - {}", site.name);
    let operator = Notification {
        html: document(&operator_title, "", &fields),
        subject: operator_title,
    };

    let body = format!(
        "<p>Cher/Chère {first_name},</p>
<p>Nous avons bien reçu votre message concernant : <strong>{subject}</strong></p>
<p>Notre équipe vous répondra dans les plus brefs délais, généralement sous 24 heures.</p>
<p>En attendant, n'hésitez pas à nous contacter directement au <strong>{phone}</strong> si vous avez une demande urgente.</p>
<p>Cordialement,<br />L'équipe {site}</p>",
        first_name = submission.first_name,
        subject = submission.subject,
        phone = site.contact_phone,
        site = site.name,
    );
    let requester = Notification {
        subject: format!("Confirmation de votre message - {}", site.name),
        html: document("Merci pour votre message", "", &body),
    };

    NotificationPair {
        operator,
        requester,
    }
}

pub fn compose_demo(
    site: &SiteConfig,
    request: &DemoBookingRequest,
    booking_id: &str,
) -> NotificationPair {
    let date = display_date(request);
    let interests = if request.interests.is_empty() {
        "Aucun spécifié".to_string()
    } else {
        request.interests.join(", ")
    };
    let message = if request.message.is_empty() {
        "Aucun message".to_string()
    } else {
        nl2br(&request.message)
    };
    let reference = format!("<div class='booking-id'>Référence: {}</div>", booking_id);

    let fields = [
        field("Client", &format!("{} {}", request.first_name, request.last_name)),
        field("Email", &request.email),
        field("Téléphone", &request.phone),
        field("Entreprise", or_default(&request.company, "Non renseigné")),
        field("Date souhaitée", &date),
        field("Créneau horaire", request.time_slot.as_str()),
        field("Nombre d'invités", &request.guests.to_string()),
        field("Centres d'intérêt", &interests),
        field("Message", &message),
        field("Date de demande", &request.timestamp),
    ]
    .concat();

    let operator = Notification {
        subject: format!("Nouvelle demande de démonstration - {}", site.name),
        html: document("Nouvelle Demande de Démonstration", &reference, &fields),
    };

    let body = format!(
        "{reference}
<p>Cher/Chère {first_name},</p>
<p>Nous avons bien reçu votre demande de démonstration et sommes ravis de vous accueillir chez {site}.</p>
<div class='info-box'>
<h4>Détails de votre réservation:</h4>
<p><strong>Date:</strong> {date}</p>
<p><strong>Heure:</strong> {slot}</p>
<p><strong>Nombre de personnes:</strong> {guests}</p>
<p><strong>Durée:</strong> 2 heures</p>
</div>
<div class='info-box'>
<h4>Ce qui vous attend:</h4>
<ul>
<li>Visite guidée personnalisée de nos installations</li>
<li>Dégustation de notre menu signature</li>
<li>Consultation gratuite avec notre équipe</li>
<li>Présentation de nos services premium</li>
<li>Cadeau de bienvenue exclusif</li>
</ul>
</div>
<p><strong>Important:</strong> Notre équipe vous contactera sous 24h pour confirmer la disponibilité et finaliser les détails de votre visite.</p>
<p>Pour toute question, n'hésitez pas à nous contacter au <strong>{phone}</strong>.</p>
<p>À bientôt chez {site} !<br />L'équipe {site}</p>",
        reference = reference,
        first_name = request.first_name,
        site = site.name,
        date = date,
        slot = request.time_slot.label(),
        guests = request.guests,
        phone = site.contact_phone,
    );
    let requester = Notification {
        subject: format!(
            "Confirmation de votre demande de démonstration - {}",
            site.name
        ),
        html: document("Confirmation de votre démonstration", "", &body),
    };

    NotificationPair {
        operator,
        requester,
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn document(title: &str, banner: &str, content: &str) -> String {
    format!(
        "<html>
<head>
<meta charset='UTF-8'>
<style>
{STYLE}
</style>
</head>
<body>
<div class='container'>
<div class='header'><h2>{title}</h2></div>
{banner}
<div class='content'>
{content}
</div>
</div>
</body>
</html>
"
    )
}

fn field(label: &str, value: &str) -> String {
    format!(
        "<div class='field'>\n<div class='label'>{}:</div>\n<div class='value'>{}</div>\n</div>\n",
        label, value
    )
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn nl2br(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "<br />\n")
}

/// `dd/mm/YYYY`, or the raw input if it never parsed
fn display_date(request: &DemoBookingRequest) -> String {
    request
        .preferred_day
        .map(|day| day.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| request.preferred_date.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeSlot;
    use chrono::NaiveDate;

    fn contact() -> ContactSubmission {
        ContactSubmission {
            first_name: "Jean".to_string(),
            last_name: "Dupont".to_string(),
            email: "jean@example.com".to_string(),
            phone: String::new(),
            subject: "Réservation".to_string(),
            message: "Bonjour,\nje voudrais réserver.".to_string(),
            newsletter: true,
            timestamp: "2026-10-21 09:30:00".to_string(),
            mail_address: "jean@example.com".to_string(),
        }
    }

    fn demo(slot: TimeSlot) -> DemoBookingRequest {
        DemoBookingRequest {
            first_name: "Marie".to_string(),
            last_name: "Curie".to_string(),
            email: "marie@example.com".to_string(),
            phone: "0612345678".to_string(),
            company: String::new(),
            preferred_date: "2026-10-23".to_string(),
            time_slot: slot,
            guests: 3,
            interests: vec![],
            message: String::new(),
            timestamp: "2026-10-21 09:30:00".to_string(),
            preferred_day: NaiveDate::from_ymd_opt(2026, 10, 23),
            mail_address: "marie@example.com".to_string(),
        }
    }

    #[test]
    fn test_contact_operator_mail() {
        let pair = compose_contact(&SiteConfig::default(), &contact());
        assert_eq!(
            pair.operator.subject,
            "Nouveau message de contact - Beehive Lodge"
        );
        assert!(pair.operator.html.contains("Jean Dupont"));
        assert!(pair.operator.html.contains("Non renseigné"));
        assert!(pair.operator.html.contains("Bonjour,<br />\nje voudrais réserver."));
        assert!(pair.operator.html.contains("<div class='value'>Oui</div>"));
    }

    #[test]
    fn test_contact_requester_mail() {
        let pair = compose_contact(&SiteConfig::default(), &contact());
        assert_eq!(
            pair.requester.subject,
            "Confirmation de votre message - Beehive Lodge"
        );
        assert!(pair.requester.html.contains("Cher/Chère Jean"));
        assert!(pair.requester.html.contains("<strong>Réservation</strong>"));
        assert!(pair.requester.html.contains("+33 1 23 45 67 89"));
    }

    #[test]
    fn test_demo_mails_carry_booking_id() {
        let pair = compose_demo(&SiteConfig::default(), &demo(TimeSlot::Morning), "DEMO-20261021-a1b2c3");
        assert!(pair.operator.html.contains("Référence: DEMO-20261021-a1b2c3"));
        assert!(pair.requester.html.contains("Référence: DEMO-20261021-a1b2c3"));
        assert!(pair.operator.html.contains("23/10/2026"));
        assert!(pair.operator.html.contains("Aucun spécifié"));
        assert!(pair.operator.html.contains("Aucun message"));
        assert!(pair.requester.html.contains("10h00 - 12h00"));
        assert!(pair.requester.html.contains("2 heures"));
    }

    #[test]
    fn test_demo_unknown_slot_falls_back_to_raw_value() {
        let pair = compose_demo(
            &SiteConfig::default(),
            &demo(TimeSlot::Other("vers midi".to_string())),
            "DEMO-20261021-a1b2c3",
        );
        assert!(pair.requester.html.contains("<strong>Heure:</strong> vers midi"));
    }

    #[test]
    fn test_composer_is_deterministic() {
        let site = SiteConfig::default();
        let request = demo(TimeSlot::Evening);
        assert_eq!(
            compose_demo(&site, &request, "DEMO-20261021-000000"),
            compose_demo(&site, &request, "DEMO-20261021-000000")
        );
    }
}
