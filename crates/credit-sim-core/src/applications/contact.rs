/// Country calling code prepended to local numbers.
pub const COUNTRY_CODE: &str = "57";
const WHATSAPP_BASE_URL: &str = "https://wa.me/";
const CONTACT_MESSAGE: &str = "Hola! Quiero continuar con mi solicitud de crédito. Mi ID es: ";

/// Chat deeplink that lets the applicant continue the process with their
/// application id pre-filled.
///
/// Only spaces in the message are percent-encoded; the messaging service
/// accepts the remaining characters verbatim.
pub fn contact_url(phone: &str, application_id: &str) -> String {
    let mut number: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    if !number.starts_with(COUNTRY_CODE) {
        number.insert_str(0, COUNTRY_CODE);
    }
    let message = format!("{CONTACT_MESSAGE}{application_id}").replace(' ', "%20");
    format!("{WHATSAPP_BASE_URL}{number}?text={message}")
}
