//! Model client: identification and recipe generation

use crate::backend::{ModelBackend, ModelRequest};
use crate::config::{ApiKey, ConfigProvider, ModelSettings};
use crate::error::ModelError;
use crate::prompts;
use core_pipeline::{parse_model_text, FoodIdentification, ModelShape, RecipeSet, UploadedImage};
use std::sync::Arc;

/// Runs prompts against the vision and text models and parses the replies
#[derive(Debug, Clone)]
pub struct ModelClient {
    backend: Arc<dyn ModelBackend>,
    config: ConfigProvider,
    settings: ModelSettings,
}

impl ModelClient {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        config: ConfigProvider,
        settings: ModelSettings,
    ) -> Self {
        Self {
            backend,
            config,
            settings,
        }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Resolve the API key without calling anything
    pub fn credential(&self) -> Result<ApiKey, ModelError> {
        Ok(self.config.api_key()?)
    }

    /// Identify the dish in an uploaded image
    pub async fn identify_food(
        &self,
        image: &UploadedImage,
    ) -> Result<FoodIdentification, ModelError> {
        let api_key = self.credential()?;
        let payload = image.encode();

        tracing::debug!(
            bytes = image.len(),
            encoded = payload.data.len(),
            mime = %payload.mime_type,
            "Encoded image for identification"
        );

        let request = ModelRequest {
            model: self.settings.vision_model.clone(),
            prompt: prompts::food_identification(self.settings.language),
            image: Some(payload),
            temperature: self.settings.temperature,
            max_output_tokens: self.settings.max_output_tokens,
        };

        self.invoke(&api_key, &request).await
    }

    /// Ask for recipes based on an identified dish
    ///
    /// Five are requested; whatever number the model returns is accepted.
    pub async fn generate_recipes(
        &self,
        food_name: &str,
        description: &str,
    ) -> Result<RecipeSet, ModelError> {
        if food_name.trim().is_empty() {
            return Err(ModelError::InvalidInput("food name is empty".to_string()));
        }
        let api_key = self.credential()?;

        let request = self.text_request(prompts::recipe_generation(
            self.settings.language,
            food_name,
            description,
        ));

        self.invoke(&api_key, &request).await
    }

    /// Ask for recipes that use the given ingredients
    pub async fn generate_recipes_from_ingredients(
        &self,
        ingredients: &[String],
    ) -> Result<RecipeSet, ModelError> {
        let ingredients: Vec<String> = ingredients
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        if ingredients.is_empty() {
            return Err(ModelError::InvalidInput(
                "ingredient list is empty".to_string(),
            ));
        }
        let api_key = self.credential()?;

        let request = self.text_request(prompts::recipes_from_ingredients(
            self.settings.language,
            &ingredients,
        ));

        self.invoke(&api_key, &request).await
    }

    fn text_request(&self, prompt: String) -> ModelRequest {
        ModelRequest {
            model: self.settings.text_model.clone(),
            prompt,
            image: None,
            temperature: self.settings.temperature,
            max_output_tokens: self.settings.max_output_tokens,
        }
    }

    async fn invoke<T: ModelShape>(
        &self,
        api_key: &ApiKey,
        request: &ModelRequest,
    ) -> Result<T, ModelError> {
        let raw = self.backend.generate(api_key, request).await.map_err(|e| {
            tracing::warn!(
                provider = self.backend.provider_name(),
                model = %request.model,
                error = %e,
                "Model call failed"
            );
            e
        })?;

        tracing::debug!(len = raw.len(), shape = T::SHAPE, "Received model response");

        parse_model_text::<T>(&raw).map_err(|e| {
            tracing::warn!(shape = T::SHAPE, reason = %e.reason, "Unparseable model response");
            ModelError::Parse(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelInvocationError;
    use crate::fake::ScriptedBackend;
    use core_pipeline::Language;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn client(backend: Arc<ScriptedBackend>, key: Option<&str>) -> ModelClient {
        ModelClient::new(
            backend,
            ConfigProvider::new(None, key.map(String::from)),
            ModelSettings::default(),
        )
    }

    fn image() -> UploadedImage {
        UploadedImage::from_bytes(PNG.to_vec(), Some("image/png")).unwrap()
    }

    #[tokio::test]
    async fn test_identify_food_sends_image_to_vision_model() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_ok(
            "```json\n{\"name\":\"Ramen\",\"description\":\"Noodle soup\",\"confidence\":0.8}\n```",
        );

        let food = client(backend.clone(), Some("key"))
            .identify_food(&image())
            .await
            .unwrap();
        assert_eq!(food.name, "Ramen");

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, ModelSettings::default().vision_model);
        let sent = calls[0].image.as_ref().unwrap();
        assert_eq!(sent.mime_type.as_str(), "image/png");
    }

    #[tokio::test]
    async fn test_generate_recipes_accepts_any_count() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_ok(
            r#"[{"name":"A","description":"a","ingredients":["x"]},
                {"name":"B","description":"b","ingredients":["y"]}]"#,
        );

        let recipes = client(backend.clone(), Some("key"))
            .generate_recipes("Ramen", "Noodle soup")
            .await
            .unwrap();
        assert_eq!(recipes.len(), 2);

        let calls = backend.calls();
        assert!(calls[0].image.is_none());
        assert!(calls[0].prompt.contains("\"Ramen\""));
    }

    #[tokio::test]
    async fn test_missing_credential_skips_network() {
        let backend = Arc::new(ScriptedBackend::new());
        let err = client(backend.clone(), None)
            .generate_recipes("Ramen", "Noodle soup")
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingCredential(_)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invocation_and_parse_errors_are_distinct() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_err(ModelInvocationError::Timeout);
        backend.push_ok("I think this is a pizza.");
        let client = client(backend, Some("key"));

        let err = client.identify_food(&image()).await.unwrap_err();
        assert_eq!(err, ModelError::Invocation(ModelInvocationError::Timeout));

        let err = client.identify_food(&image()).await.unwrap_err();
        match err {
            ModelError::Parse(e) => {
                assert!(e.is_syntax_error());
                assert_eq!(e.raw, "I think this is a pizza.");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ingredients_are_trimmed_and_required() {
        let backend = Arc::new(ScriptedBackend::new());
        let c = client(backend.clone(), Some("key"));

        let err = c
            .generate_recipes_from_ingredients(&[" ".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidInput(_)));
        assert!(backend.calls().is_empty());

        backend.push_ok(r#"[{"name":"Omelette","description":"Eggs","ingredients":["eggs"]}]"#);
        let recipes = c
            .generate_recipes_from_ingredients(&["eggs ".to_string(), "".to_string()])
            .await
            .unwrap();
        assert_eq!(recipes[0].name, "Omelette");
        assert!(backend.calls()[0].prompt.contains("\"eggs\""));
    }

    #[tokio::test]
    async fn test_language_selects_prompt() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_ok(r#"{"name":"Paella","description":"Arroz","confidence":1}"#);
        let c = ModelClient::new(
            backend.clone(),
            ConfigProvider::new(Some("key".into()), None),
            ModelSettings::default().with_language(Language::Spanish),
        );
        c.identify_food(&image()).await.unwrap();
        assert!(backend.calls()[0].prompt.contains("español"));
    }
}
