//! Coach proxy: forwards chat messages to the LLM upstream.
//!
//! The "Coach Énergie" is an opaque collaborator. This client sends the user
//! text plus prior turns to a generateContent-style endpoint and returns the
//! model text. No retry, no backoff, no streaming.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::AppError;

/// System instruction shipped with every conversation. The upstream model is
/// the only consumer; the dashboard never sees it.
const SYSTEM_INSTRUCTION: &str = "\
Tu es le \"Coach Énergie\", un assistant expert dédié aux apporteurs d'affaires du réseau \"Système de Parrainage National - Énergie Renouvelable\".
Ta mission est d'aider les parrains à convaincre des propriétaires de maisons individuelles d'installer des solutions écologiques (Panneaux solaires, Pompes à chaleur, Isolation).

Tes capacités :
1. Rédiger des messages d'approche (SMS, Email, Scripts téléphoniques) professionnels et conviviaux.
2. Expliquer simplement des concepts techniques (ex: kWc, COP, RGE, MaPrimeRénov').
3. Aider à traiter les objections courantes (ex: \"C'est trop cher\", \"Je n'ai pas confiance\", \"Je verrai plus tard\").
4. Calculer des estimations rapides de rentabilité ou d'économies.

Ton ton doit être :
- Encouragent et motivant pour le parrain.
- Professionnel, clair et honnête.
- Orienté vers l'action (aider à obtenir un rendez-vous).

Informations clés sur le programme :
- Panneaux solaires : 500€ à 1200€ de commission.
- Pompe à chaleur : 300€ à 800€ de commission.
- Isolation : 400€ à 600€ de commission.
- L'entreprise s'occupe de tout une fois le lead transmis (technique, admin, travaux).";

/// Who spoke a chat turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One prior turn of the conversation, as the dashboard stores it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: ContentBlock,
    generation_config: GenerationConfig,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ContentBlock {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// Outbound client for the coach upstream.
#[derive(Clone)]
pub struct CoachClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl CoachClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.coach_base_url.trim_end_matches('/').to_string(),
            model: config.coach_model.clone(),
            api_key: config.coach_api_key.clone(),
        }
    }

    /// Forward one message plus prior turns and return the model text.
    pub async fn send_message(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<String, AppError> {
        let Some(api_key) = &self.api_key else {
            return Err(AppError::CoachUnavailable(
                "Coach API key is not configured".to_string(),
            ));
        };

        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content {
                role: match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Model => "model",
                },
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();
        contents.push(Content {
            role: "user",
            parts: vec![Part {
                text: message.to_string(),
            }],
        });

        let body = GenerateRequest {
            system_instruction: ContentBlock {
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            generation_config: GenerationConfig { temperature: 0.7 },
            contents,
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimited(
                "Coach upstream rate limit reached".to_string(),
            ));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!("Coach upstream returned {}: {}", status, detail);
            return Err(AppError::CoachNetwork(format!(
                "Coach upstream returned {}",
                status
            )));
        }

        let payload: GenerateResponse = response.json().await?;
        let text: String = payload
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::CoachNetwork(
                "Coach upstream returned an empty response".to_string(),
            ));
        }

        Ok(text)
    }
}
