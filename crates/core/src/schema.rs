//! Structured-output schemas.
//!
//! The same `Schema` value is sent to the model as `responseSchema` and used by
//! the validators to decide whether a response is trustworthy.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::types::AnalysisKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    Array,
    String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Schema {
    fn node(kind: SchemaType) -> Self {
        Self {
            kind,
            description: None,
            properties: BTreeMap::new(),
            property_ordering: Vec::new(),
            items: None,
            required: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::node(SchemaType::String)
    }

    pub fn object() -> Self {
        Self::node(SchemaType::Object)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::node(SchemaType::Array)
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Add a required property. Properties keep their insertion order.
    pub fn field(mut self, name: &str, schema: Schema) -> Self {
        self.property_ordering.push(name.to_string());
        self.required.push(name.to_string());
        self.properties.insert(name.to_string(), schema);
        self
    }

    /// Check the shape of an already-parsed JSON value.
    ///
    /// Objects must carry every required field with a non-null value, and
    /// array-typed fields must be arrays whose elements conform to `items`.
    /// Unknown fields are ignored.
    pub fn accepts(&self, value: &Value) -> bool {
        self.mismatch(value, "$").is_none()
    }

    /// Like `accepts`, but names the first offending path.
    pub fn mismatch(&self, value: &Value, path: &str) -> Option<String> {
        match self.kind {
            SchemaType::String => (!value.is_string()).then(|| format!("{path} is not a string")),
            SchemaType::Array => {
                let Some(elements) = value.as_array() else {
                    return Some(format!("{path} is not an array"));
                };
                let items = self.items.as_deref()?;
                elements
                    .iter()
                    .enumerate()
                    .find_map(|(i, element)| items.mismatch(element, &format!("{path}[{i}]")))
            }
            SchemaType::Object => {
                let Some(object) = value.as_object() else {
                    return Some(format!("{path} is not an object"));
                };
                self.required.iter().find_map(|name| {
                    let child_path = format!("{path}.{name}");
                    match object.get(name) {
                        None | Some(Value::Null) => Some(format!("{child_path} is missing")),
                        Some(child) => self
                            .properties
                            .get(name)
                            .and_then(|schema| schema.mismatch(child, &child_path)),
                    }
                })
            }
        }
    }
}

fn string_list(description: &str) -> Schema {
    Schema::array(Schema::string()).describe(description)
}

fn related_videos() -> Schema {
    Schema::array(
        Schema::object()
            .field(
                "title",
                Schema::string().describe("The title of the suggested video."),
            )
            .field(
                "reason",
                Schema::string().describe("A brief explanation of why this video is relevant."),
            ),
    )
    .describe("A list of 3 to 5 related video suggestions.")
}

pub fn summary_schema() -> Schema {
    Schema::object()
        .field(
            "title",
            Schema::string().describe("The title of the YouTube video."),
        )
        .field(
            "channel",
            Schema::string().describe("The name of the YouTube channel that uploaded the video."),
        )
        .field(
            "summary",
            Schema::string().describe("The concise summary of the video."),
        )
        .field("relatedVideos", related_videos())
}

pub fn key_points_schema() -> Schema {
    Schema::object()
        .field(
            "keyPoints",
            string_list("An array of the key points from the video."),
        )
        .field("relatedVideos", related_videos())
}

pub fn quiz_schema() -> Schema {
    Schema::object().field(
        "questions",
        Schema::array(
            Schema::object()
                .field("question", Schema::string())
                .field("options", Schema::array(Schema::string()))
                .field("answer", Schema::string())
                .field("explanation", Schema::string()),
        ),
    )
}

pub fn content_idea_schema() -> Schema {
    Schema::object()
        .field(
            "mainIdea",
            Schema::string().describe("The main idea for the new content."),
        )
        .field(
            "keyTakeaways",
            string_list("Key takeaways for the new content."),
        )
}

pub fn deep_dive_schema() -> Schema {
    Schema::object()
        .field(
            "coreConcepts",
            string_list("A list of the fundamental ideas discussed."),
        )
        .field(
            "keyArguments",
            string_list("A list of the main arguments made in the video."),
        )
        .field(
            "targetAudience",
            Schema::string().describe("A description of the intended audience."),
        )
        .field(
            "overallTone",
            Schema::string().describe("An analysis of the video's overall tone."),
        )
}

pub fn video_suggestions_schema() -> Schema {
    Schema::object().field(
        "videos",
        Schema::array(
            Schema::object()
                .field(
                    "videoId",
                    Schema::string().describe("The unique 11-character YouTube video ID."),
                )
                .field("title", Schema::string().describe("The title of the video."))
                .field(
                    "channel",
                    Schema::string().describe("The name of the YouTube channel."),
                )
                .field(
                    "description",
                    Schema::string()
                        .describe("A brief, one-sentence description of the video's relevance."),
                ),
        )
        .describe("A list of 5 recommended YouTube videos."),
    )
}

/// Response schema for a kind; free-text kinds have none.
pub fn schema_for(kind: AnalysisKind) -> Option<Schema> {
    match kind {
        AnalysisKind::Summary => Some(summary_schema()),
        AnalysisKind::KeyPoints => Some(key_points_schema()),
        AnalysisKind::Quiz => Some(quiz_schema()),
        AnalysisKind::ContentIdea => Some(content_idea_schema()),
        AnalysisKind::DeepDive => Some(deep_dive_schema()),
        AnalysisKind::Transcript
        | AnalysisKind::Timestamps
        | AnalysisKind::Scene
        | AnalysisKind::Clips => None,
    }
}

/// `schema_for` over a kind name; unrecognized names get no schema.
pub fn schema_for_name(name: &str) -> Option<Schema> {
    name.parse().ok().and_then(schema_for)
}
