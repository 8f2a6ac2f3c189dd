//! Prompt templates for identification and recipe generation

use core_pipeline::Language;

/// Number of recipes requested per generation call
pub const RECIPES_PER_REQUEST: usize = 5;

/// Prompt asking the vision model for a single identification record
pub fn food_identification(language: Language) -> String {
    match language {
        Language::English => r#"You are an expert food identifier. Analyze the image and identify the main dish. If the image is unclear, name the most likely dish and lower the confidence accordingly.

Respond ONLY with a single JSON object with these keys:
- "name": the name of the dish (e.g. "Margherita Pizza").
- "description": a brief, one-sentence description of the dish.
- "confidence": a number from 0.0 (not confident) to 1.0 (certain).

Respond in English. Do not include any text, markdown formatting, or explanations outside of the JSON object."#
            .to_string(),
        Language::Spanish => r#"Eres un experto identificador de alimentos. Analiza la imagen e identifica el plato principal. Si la imagen no es clara, nombra el plato más probable y reduce la confianza en consecuencia.

Responde SÓLO con un único objeto JSON con estas claves:
- "name": el nombre del plato (ej. "Pizza Margherita").
- "description": una breve descripción del plato en una oración.
- "confidence": un número de 0.0 (poca confianza) a 1.0 (certeza total).

Responde en español. No incluyas texto, formato markdown o explicaciones fuera del objeto JSON."#
            .to_string(),
    }
}

/// Prompt asking the text model for recipes based on an identified dish
pub fn recipe_generation(language: Language, food_name: &str, description: &str) -> String {
    match language {
        Language::English => format!(
            r#"You are a culinary expert. Based on the dish "{food_name}" ({description}), suggest exactly {n} unique and appealing recipes that one person can cook.
{schema_en}"#,
            food_name = food_name,
            description = description,
            n = RECIPES_PER_REQUEST,
            schema_en = RECIPE_SCHEMA_EN,
        ),
        Language::Spanish => format!(
            r#"Eres un experto culinario. Basado en el plato "{food_name}" ({description}), sugiere exactamente {n} recetas únicas y atractivas que una persona puede cocinar.
{schema_es}"#,
            food_name = food_name,
            description = description,
            n = RECIPES_PER_REQUEST,
            schema_es = RECIPE_SCHEMA_ES,
        ),
    }
}

/// Prompt asking the text model for recipes using a list of ingredients
pub fn recipes_from_ingredients(language: Language, ingredients: &[String]) -> String {
    let list = ingredients.join(", ");
    match language {
        Language::English => format!(
            r#"You are a culinary expert. Based on the following list of ingredients "{list}", suggest exactly {n} unique and appealing recipes that one person can cook.
{schema_en}"#,
            list = list,
            n = RECIPES_PER_REQUEST,
            schema_en = RECIPE_SCHEMA_EN,
        ),
        Language::Spanish => format!(
            r#"Eres un experto culinario. Basado en la siguiente lista de ingredientes "{list}", sugiere exactamente {n} recetas únicas y atractivas que una persona puede cocinar.
{schema_es}"#,
            list = list,
            n = RECIPES_PER_REQUEST,
            schema_es = RECIPE_SCHEMA_ES,
        ),
    }
}

const RECIPE_SCHEMA_EN: &str = r#"Respond ONLY with a JSON array of objects. Each object must have these keys:
- "name": the name of the recipe.
- "description": a brief, one-sentence description of the recipe.
- "ingredients": a list of 3-5 essential ingredients.

Respond in English. Do not include any text, markdown formatting, or explanations outside of the JSON array."#;

const RECIPE_SCHEMA_ES: &str = r#"Responde SÓLO con un array JSON de objetos. Cada objeto debe tener estas claves:
- "name": el nombre de la receta.
- "description": una breve descripción de la receta en una oración.
- "ingredients": una lista de 3-5 ingredientes esenciales.

Responde en español. No incluyas texto, formato markdown o explicaciones fuera del array JSON."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identification_prompt_names_keys() {
        for lang in Language::ALL {
            let prompt = food_identification(lang);
            assert!(prompt.contains("\"name\""));
            assert!(prompt.contains("\"confidence\""));
        }
    }

    #[test]
    fn test_identification_prompt_always_names_a_dish() {
        // A placeholder name would be fed straight into recipe generation
        for lang in Language::ALL {
            let prompt = food_identification(lang);
            assert!(!prompt.contains("No food detected"));
            assert!(prompt.contains("confidence") || prompt.contains("confianza"));
        }
    }

    #[test]
    fn test_recipe_prompt_embeds_food() {
        for lang in Language::ALL {
            let prompt = recipe_generation(lang, "Pad Thai", "Stir-fried rice noodles");
            assert!(prompt.contains("\"Pad Thai\""));
            assert!(prompt.contains("Stir-fried rice noodles"));
            assert!(prompt.contains("\"ingredients\""));
        }
    }

    #[test]
    fn test_recipe_prompt_language() {
        assert!(recipe_generation(Language::English, "Soup", "Hot").contains("Respond in English"));
        assert!(recipe_generation(Language::Spanish, "Sopa", "Caliente").contains("español"));
    }

    #[test]
    fn test_ingredient_prompt_joins_list() {
        let prompt = recipes_from_ingredients(
            Language::English,
            &["eggs".to_string(), "spinach".to_string()],
        );
        assert!(prompt.contains("\"eggs, spinach\""));
        assert!(prompt.contains("exactly 5"));
    }
}
