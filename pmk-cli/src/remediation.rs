//! Actionable hints printed under a failed command.

use pmk_agent::StepFailure;
use pmk_core::{PmkError, Vendor};

fn key_variable(vendor: Vendor) -> &'static str {
    match vendor {
        Vendor::Linear => "LINEAR_API_KEY",
        Vendor::Miro => "MIRO_API_KEY",
        Vendor::Notion => "NOTION_API_KEY",
        Vendor::Pinecone => "PINECONE_API_KEY",
        Vendor::Gemini => "GOOGLE_GENERATIVE_AI_API_KEY",
    }
}

fn auth_hint(vendor: Vendor, status: u16) -> String {
    format!(
        "{vendor} rejected the credentials ({status}); regenerate your API key and update {}",
        key_variable(vendor)
    )
}

/// Hint for an error anywhere in `error`'s chain.
pub fn hint_for(error: &anyhow::Error) -> Option<String> {
    error.chain().find_map(|cause| cause.downcast_ref::<PmkError>()).and_then(hint_for_pmk)
}

pub fn hint_for_pmk(error: &PmkError) -> Option<String> {
    match error {
        PmkError::VendorApi { vendor, status: status @ (401 | 403), .. } => {
            Some(auth_hint(*vendor, *status))
        }
        PmkError::Transport { vendor, .. } => {
            Some(format!("could not reach {vendor}; check your network connection and retry"))
        }
        PmkError::Config(_) => {
            Some("set the missing variable in your environment or .env file".to_string())
        }
        _ => None,
    }
}

/// Hint for a step failure recorded on a run.
pub fn hint_for_failure(failure: &StepFailure) -> Option<String> {
    match failure.kind.as_str() {
        "vendor_api" => {
            let vendor = [
                Vendor::Gemini,
                Vendor::Linear,
                Vendor::Miro,
                Vendor::Notion,
                Vendor::Pinecone,
            ]
            .into_iter()
            .find(|vendor| failure.message.starts_with(vendor.as_str()))?;
            [401, 403]
                .into_iter()
                .find(|status| failure.message.contains(&format!("({status})")))
                .map(|status| auth_hint(vendor, status))
        }
        "malformed_agent_response" => Some(format!(
            "the {} step returned unusable output; send feedback to retry it",
            failure.step
        )),
        "config" => {
            Some("set the missing variable in your environment or .env file".to_string())
        }
        _ => None,
    }
}
