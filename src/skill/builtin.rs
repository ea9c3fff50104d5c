use super::response::SkillResponse;
use rust_i18n::t;

pub fn launch() -> SkillResponse {
    let greeting = t!("launch_greeting").to_string();
    SkillResponse::ask(greeting.clone(), greeting)
}

pub fn help() -> SkillResponse {
    let prompt = t!("help_prompt").to_string();
    SkillResponse::ask(prompt.clone(), prompt)
}

pub fn cancel_stop() -> SkillResponse {
    SkillResponse::tell(t!("goodbye"))
}

pub fn fallback() -> SkillResponse {
    SkillResponse::ask(t!("fallback_prompt"), t!("fallback_reprompt"))
}

/// The platform is already closing the session, nothing is spoken
pub fn session_ended() -> SkillResponse {
    SkillResponse::silent()
}

/// Echo back an intent no handler claims
pub fn reflector(intent_name: &str) -> SkillResponse {
    SkillResponse::tell(t!("intent_reflector", intent = intent_name))
}

/// Generic apology for any failure
pub fn apology() -> SkillResponse {
    let speech = t!("exception_apology").to_string();
    SkillResponse::tell(speech.clone()).with_reprompt(speech)
}

/// Ask the user to say a slot again
pub fn rephrase(slot: &str) -> SkillResponse {
    let spoken_slot = match slot {
        "date" => t!("slot_name_date"),
        "time" => t!("slot_name_time"),
        "eventName" => t!("slot_name_event"),
        other => other.to_string().into(),
    };
    let speech = t!("slot_rephrase", slot = spoken_slot).to_string();
    SkillResponse::ask(speech.clone(), speech)
}
