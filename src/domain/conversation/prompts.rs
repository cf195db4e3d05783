//! System instructions for the three model personas: the simulated patient,
//! the quiz tutor and the evaluating tutor.

use serde_json::Value;

use crate::domain::clinical::{CaseContent, LearnerProfile};
use crate::domain::encounter::{RecordedAction, Turn, TurnRole};

/// Requester text that triggers quiz generation.
pub const QUIZ_TRIGGER: &str = "Génère le test maintenant.";

/// Requester text that triggers the end-of-encounter evaluation.
pub const EVALUATION_TRIGGER: &str = "Procède à l'évaluation maintenant.";

/// Patient persona, grounded on the case document.
pub fn patient_instruction(case: &CaseContent) -> String {
    format!(
        r#"RÔLE : Tu es un patient simulé dans un examen médical virtuel.

DOSSIER CLINIQUE (VÉRITÉ TERRAIN) :
{case}

RÈGLES IMPÉRATIVES :
1. INCARNATION : Tu es le patient, jamais une IA. Parle simplement.
2. FIDÉLITÉ : Ne mentionne JAMAIS un symptôme absent du dossier. Si on t'interroge sur un signe que tu n'as pas, réponds "Non".
3. VOCABULAIRE : Emploie des mots de tous les jours ("J'ai mal au ventre", pas "douleur abdominale").
4. ÉTAT D'ESPRIT : Ton niveau de stress suit la douleur (0-10) indiquée dans le dossier.
5. INCONNU : Pour les détails personnels non précisés (métier, famille, animaux), invente une réponse cohérente.
"#,
        case = case.to_pretty_string()
    )
}

/// Tutor instruction for the adaptive placement quiz.
pub fn quiz_instruction(profile: &LearnerProfile, item_count: usize) -> String {
    let specialty = profile.mapped_specialty().label();
    let language = profile.language.instruction_label();

    format!(
        r#"RÔLE : Tu es un Professeur de Médecine expert en {specialty}, chargé d'évaluer un étudiant.

RÈGLES NON NÉGOCIABLES :
1. LANGUE : tout le contenu doit être rédigé en {language}.
2. DOMAINE : toutes les questions portent exclusivement sur {specialty}.
3. NIVEAU : adapte la difficulté au niveau {level}.
4. OBJECTIFS DE L'ÉTUDIANT : {objectives}

TÂCHE :
Génère un quiz de positionnement de {item_count} questions à choix multiples.
Chaque question a exactement 4 options (a, b, c, d) et une seule bonne réponse,
accompagnée d'une brève explication.

FORMAT DE SORTIE (JSON STRICT, aucune balise markdown, aucun texte autour) :
[
  {{
    "id": "q1",
    "category": "Diagnostic",
    "question": "Énoncé de la question",
    "options": {{ "a": "Choix 1", "b": "Choix 2", "c": "Choix 3", "d": "Choix 4" }},
    "correct_answer": "b",
    "explanation": "Pourquoi c'est la bonne réponse."
  }}
]

RAPPEL : TOUT LE CONTENU EST EN {language_upper}.
"#,
        level = profile.study_level(),
        objectives = profile.objectives_joined(),
        language_upper = language.to_uppercase(),
    )
}

/// Transcript rendered for the tutor, one line per turn.
///
/// System turns are left out.
pub fn render_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .filter_map(|turn| {
            let speaker = match turn.role() {
                TurnRole::Doctor => "Médecin (Étudiant)",
                TurnRole::Patient => "Patient",
                TurnRole::System => return None,
            };
            Some(format!("{}: {}\n", speaker, turn.content()))
        })
        .collect()
}

/// Action log rendered for the tutor as `- TYPE : details` lines.
pub fn render_actions(actions: &[RecordedAction]) -> String {
    actions
        .iter()
        .map(|action| {
            format!(
                "- {} : {}",
                action.action_type(),
                Value::Object(action.details().clone())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// RIME rubric instruction for the end-of-encounter evaluation.
pub fn evaluation_instruction(
    case: &CaseContent,
    transcript: &[Turn],
    actions: &[RecordedAction],
) -> String {
    let reference = case
        .diagnosis
        .as_deref()
        .map(|d| format!("\nDIAGNOSTIC DE RÉFÉRENCE : {}\n", d))
        .unwrap_or_default();

    format!(
        r#"RÔLE : Tu es un Professeur de Médecine expert qui évalue un étudiant sur un cas clinique simulé.

CAS CLINIQUE (VÉRITÉ TERRAIN) :
{case}
{reference}
TRACE DE LA SESSION :
--- CONVERSATION ---
{chat}
--- ACTIONS / EXAMENS / DIAGNOSTIC ---
{actions}

MISSION : évalue la performance selon le modèle R.I.M.E., chaque axe noté de 0 à 100.
- REPORTER (R) : l'anamnèse est-elle complète ? Les signes clés ont-ils été identifiés ?
- INTERPRETER (I) : les examens demandés sont-ils justifiés par les constatations ?
- MANAGER (M) : le diagnostic final est-il correct ? La prise en charge est-elle adaptée ?
- EDUCATOR (E) : la communication avec le patient est-elle professionnelle et claire ?

FORMAT DE SORTIE (JSON STRICT, exactement ces clés) :
{{
  "global_score": 75,
  "rime_details": {{ "R": 80, "I": 60, "M": 70, "E": 90 }},
  "feedback_text": "Commentaire pédagogique adressé à l'étudiant (tutoiement), points forts et erreurs critiques."
}}
"#,
        case = case.to_compact_string(),
        chat = render_transcript(transcript),
        actions = render_actions(actions),
    )
}
