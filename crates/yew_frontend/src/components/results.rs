//! Rendering of pipeline results and failures

use crate::api::{format_confidence, stage_label, AnalyzeResponse, ApiFailure};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ResultsProps {
    pub outcome: AnalyzeResponse,
}

#[function_component(Results)]
pub fn results(props: &ResultsProps) -> Html {
    let food = &props.outcome.identification;

    html! {
        <div class="results" data-testid="results">
            <section class="identification">
                <h2>{ "Food Identification" }</h2>
                <p><strong>{ "Dish: " }</strong>{ &food.name }</p>
                <p><strong>{ "Confidence: " }</strong>{ format_confidence(food.confidence) }</p>
                <p><strong>{ "Description: " }</strong>{ &food.description }</p>
            </section>

            <section class="recipes">
                <h2>{ "Suggested Recipes" }</h2>
                if props.outcome.recipes.is_empty() {
                    <p class="notice">{ "No recipe suggestions were returned." }</p>
                }
                <ol>
                    { for props.outcome.recipes.iter().map(|recipe| {
                        html! {
                            <li class="recipe" data-testid="recipe">
                                <h3>{ &recipe.name }</h3>
                                <p>{ &recipe.description }</p>
                                <p>
                                    <strong>{ "Key ingredients: " }</strong>
                                    { recipe.ingredients.join(", ") }
                                </p>
                            </li>
                        }
                    })}
                </ol>
            </section>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct FailureProps {
    pub failure: ApiFailure,
}

#[function_component(FailureView)]
pub fn failure_view(props: &FailureProps) -> Html {
    let failure = &props.failure;

    html! {
        <div class="error" data-testid="error">
            <h2>{ stage_label(failure.stage.as_deref()) }</h2>
            <p>{ &failure.error }</p>
            if let Some(raw) = &failure.raw_response {
                <details>
                    <summary>{ "Raw model response" }</summary>
                    <pre>{ raw }</pre>
                </details>
            }
        </div>
    }
}
