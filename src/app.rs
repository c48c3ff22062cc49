//! Dish orchestration: prompt assembly, sequential generation, extraction.

use crate::ai::{
    ChatService, CompletionRequest, ImageGenerationService, OpenAiChatClient, OpenAiImageClient,
};
use crate::image::ImageRequester;
use crate::models::{
    CourseMenu, CourseResult, Config, DishResult, MenuResponse, MenuVariant, StyleProfile,
};
use crate::sections::{self, COURSE_FIELDS, DISH_DETAILS};
use crate::{prompts, Error, GenerationStage, Result};
use tracing::{error, info};

const TEMPERATURE: f32 = 0.7;
const DESCRIPTION_MAX_TOKENS: u32 = 300;
const NAME_MAX_TOKENS: u32 = 50;
const DETAILS_MAX_TOKENS: u32 = 700;
const COURSES_MAX_TOKENS: u32 = 1200;

/// Generates dishes (or three-course meals) from an idea and style weights.
pub struct App {
    chat: Box<dyn ChatService>,
    images: ImageRequester,
    variant: MenuVariant,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub chat: Box<dyn ChatService>,
    pub image_gen: Box<dyn ImageGenerationService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, variant: MenuVariant) -> Self {
        Self {
            chat: services.chat,
            images: ImageRequester::new(services.image_gen),
            variant,
        }
    }

    /// Construct an app talking to the OpenAI-compatible API in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::builder().build()?;

        info!(
            "Chat model: {}, image model: {}, variant: {:?}",
            config.chat_model, config.image_model, config.menu_variant
        );

        let chat = OpenAiChatClient::new_with_client(
            config.openai_api_key.clone(),
            config.chat_model.clone(),
            config.openai_base_url.clone(),
            http_client.clone(),
        );
        let image_gen = OpenAiImageClient::new_with_client(
            config.openai_api_key.clone(),
            config.image_model.clone(),
            config.openai_base_url.clone(),
            http_client,
        );

        Ok(Self::with_services(
            AppServices {
                chat: Box::new(chat),
                image_gen: Box::new(image_gen),
            },
            config.menu_variant,
        ))
    }

    pub fn variant(&self) -> MenuVariant {
        self.variant
    }

    /// Generate the configured menu shape, including its image.
    pub async fn generate_menu(&self, idea: &str, style: &StyleProfile) -> Result<MenuResponse> {
        match self.variant {
            MenuVariant::Dish => {
                let mut dish = self.generate_dish(idea, style).await?;
                dish.image_url = self.images.generate_image(&dish.menu_item_description).await;
                Ok(MenuResponse::Dish(dish))
            }
            MenuVariant::Courses => {
                let courses = self.generate_courses(idea, style).await?;
                let descriptions = courses
                    .iter()
                    .map(|course| course.description.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                let image_url = self.images.generate_image(&descriptions).await;
                Ok(MenuResponse::Courses(CourseMenu { courses, image_url }))
            }
        }
    }

    /// Description, then ingredients/components/instructions, then name.
    ///
    /// The returned dish has no image yet.
    pub async fn generate_dish(&self, idea: &str, style: &StyleProfile) -> Result<DishResult> {
        let influences = influences_for_prompt(style);

        let description = self
            .complete(
                GenerationStage::Description,
                CompletionRequest {
                    system: prompts::DESCRIPTION_SYSTEM.to_string(),
                    user: prompts::render(
                        prompts::DESCRIPTION_USER,
                        &[("idea", idea), ("influences", influences.as_str())],
                    ),
                    max_tokens: DESCRIPTION_MAX_TOKENS,
                    temperature: TEMPERATURE,
                },
            )
            .await?;
        info!(
            "Generated description ({} chars)",
            description.chars().count()
        );

        let details = self
            .complete(
                GenerationStage::Details,
                CompletionRequest {
                    system: prompts::DETAILS_SYSTEM.to_string(),
                    user: prompts::render(
                        prompts::DETAILS_USER,
                        &[("description", description.as_str())],
                    ),
                    max_tokens: DETAILS_MAX_TOKENS,
                    temperature: TEMPERATURE,
                },
            )
            .await?;
        let mut parsed = DISH_DETAILS.parse(&details);
        for section in [sections::INGREDIENTS, sections::COMPONENTS, sections::INSTRUCTIONS] {
            if !parsed.found(section.label) {
                info!("No '{}:' section in details; using placeholder", section.label);
            }
        }

        let name = self
            .complete(
                GenerationStage::Name,
                CompletionRequest {
                    system: prompts::NAME_SYSTEM.to_string(),
                    user: prompts::render(
                        prompts::NAME_USER,
                        &[("description", description.as_str())],
                    ),
                    max_tokens: NAME_MAX_TOKENS,
                    temperature: TEMPERATURE,
                },
            )
            .await?;
        let short_name = clean_name(&name);
        if short_name.is_empty() {
            error!("Name completion was empty after cleanup: {:?}", name);
            return Err(Error::Generation(GenerationStage::Name));
        }
        info!("Generated name: {}", short_name);

        Ok(DishResult {
            short_name,
            menu_item_description: description,
            ingredients: parsed.take(sections::INGREDIENTS),
            components: Some(parsed.take(sections::COMPONENTS)),
            instructions: parsed.take(sections::INSTRUCTIONS),
            image_url: None,
        })
    }

    /// One completion for a whole three-course meal, split per course.
    pub async fn generate_courses(
        &self,
        idea: &str,
        style: &StyleProfile,
    ) -> Result<Vec<CourseResult>> {
        let influences = influences_for_prompt(style);

        let menu = self
            .complete(
                GenerationStage::Courses,
                CompletionRequest {
                    system: prompts::COURSES_SYSTEM.to_string(),
                    user: prompts::render(
                        prompts::COURSES_USER,
                        &[("idea", idea), ("influences", influences.as_str())],
                    ),
                    max_tokens: COURSES_MAX_TOKENS,
                    temperature: TEMPERATURE,
                },
            )
            .await?;

        let courses: Vec<CourseResult> = sections::split_courses(&menu)
            .into_iter()
            .map(|block| {
                let mut parsed = COURSE_FIELDS.parse(block.body);
                let name = if parsed.found(sections::NAME.label) || block.title.is_empty() {
                    parsed.take(sections::NAME)
                } else {
                    block.title.to_string()
                };
                CourseResult {
                    name,
                    description: parsed.take(sections::DESCRIPTION),
                    ingredients: parsed.take(sections::INGREDIENTS),
                    instructions: parsed.take(sections::INSTRUCTIONS),
                }
            })
            .collect();

        if courses.is_empty() {
            error!("Error generating courses: no 'Course N:' headers in completion");
            return Err(Error::Generation(GenerationStage::Courses));
        }

        info!("Generated {} courses", courses.len());
        Ok(courses)
    }

    async fn complete(&self, stage: GenerationStage, request: CompletionRequest) -> Result<String> {
        self.chat.complete(&request).await.map_err(|e| {
            error!("Error generating {}: {}", stage, e);
            Error::Generation(stage)
        })
    }
}

fn influences_for_prompt(style: &StyleProfile) -> String {
    let clause = prompts::influence_clause(style);
    if clause.is_empty() {
        prompts::NO_INFLUENCES.to_string()
    } else {
        clause
    }
}

/// Strip wrapping quotes and a leading "Name:" label from a generated name.
fn clean_name(raw: &str) -> String {
    let name = raw.trim();
    let name = name
        .strip_prefix("Name:")
        .or_else(|| name.strip_prefix("Dish name:"))
        .unwrap_or(name)
        .trim();
    name.trim_matches(|c| c == '"' || c == '\'' || c == '*')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{clean_name, App, AppServices};
    use crate::ai::mock::MOCK_IMAGE_URL;
    use crate::ai::{MockChatClient, MockImageGenerationClient};
    use crate::models::{MenuResponse, MenuVariant, StyleProfile};
    use crate::{Error, GenerationStage};
    use pretty_assertions::assert_eq;

    const DESCRIPTION: &str = "Slow-roasted duck lacquered in wildflower honey.";
    const DETAILS: &str = "Ingredients:\n- duck\n- honey\n\nComponents:\n- honey glaze\n\nInstructions:\n1. Roast.\n2. Glaze.";
    const NAME: &str = "\"Golden Hour Duck\"";

    const COURSES: &str = "Tonight's menu.\n\nCourse 1: Starter\nName: Pea Velouté\nDescription: Silky spring peas.\nIngredients: peas, cream\nInstructions: Blend.\n\nCourse 2:\nName: Honey Duck\nDescription: Lacquered duck.\nIngredients: duck\nInstructions: Roast.\n\nCourse 3: Pear Tart\nDescription: Caramelised pear.\nIngredients: pears\nInstructions: Bake.";

    fn build_app(
        chat: MockChatClient,
        image_gen: MockImageGenerationClient,
        variant: MenuVariant,
    ) -> App {
        App::with_services(
            AppServices {
                chat: Box::new(chat),
                image_gen: Box::new(image_gen),
            },
            variant,
        )
    }

    fn dish_chat() -> MockChatClient {
        MockChatClient::new()
            .with_response(DESCRIPTION)
            .with_response(DETAILS)
            .with_response(NAME)
    }

    #[tokio::test]
    async fn test_generate_dish_runs_three_sequential_calls() {
        let chat = dish_chat();
        let handle = chat.clone();
        let app = build_app(chat, MockImageGenerationClient::new(), MenuVariant::Dish);

        let style = StyleProfile::new().with("Rustic", 8).with("Modernist", 3);
        let dish = app.generate_dish("honey duck", &style).await.unwrap();

        assert_eq!(dish.short_name, "Golden Hour Duck");
        assert_eq!(dish.menu_item_description, DESCRIPTION);
        assert_eq!(dish.ingredients, "- duck\n- honey");
        assert_eq!(dish.components.as_deref(), Some("- honey glaze"));
        assert_eq!(dish.instructions, "1. Roast.\n2. Glaze.");
        assert!(dish.image_url.is_none());

        let requests = handle.get_requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].user.contains("'honey duck'"));
        assert!(requests[0].user.contains("Rustic: 8"));
        assert!(!requests[0].user.contains("Modernist"));
        assert_eq!(requests[0].max_tokens, 300);
        // Later calls build on the description.
        assert!(requests[1].user.contains(DESCRIPTION));
        assert_eq!(requests[1].max_tokens, 700);
        assert!(requests[2].user.contains(DESCRIPTION));
        assert_eq!(requests[2].max_tokens, 50);
    }

    #[tokio::test]
    async fn test_empty_style_profile_is_phrased_in_prompt() {
        let chat = dish_chat();
        let handle = chat.clone();
        let app = build_app(chat, MockImageGenerationClient::new(), MenuVariant::Dish);

        app.generate_dish("soup", &StyleProfile::new()).await.unwrap();
        assert!(handle.get_requests()[0].user.contains("none in particular"));
    }

    #[tokio::test]
    async fn test_missing_components_uses_placeholder() {
        let chat = MockChatClient::new()
            .with_response(DESCRIPTION)
            .with_response("Ingredients:\nduck\nInstructions:\nRoast.")
            .with_response("Duck");
        let app = build_app(chat, MockImageGenerationClient::new(), MenuVariant::Dish);

        let dish = app.generate_dish("duck", &StyleProfile::new()).await.unwrap();
        assert_eq!(dish.components.as_deref(), Some("No components found."));
        assert_eq!(dish.ingredients, "duck");
    }

    #[tokio::test]
    async fn test_failure_at_each_stage_fails_the_dish() {
        let cases = [
            (0, GenerationStage::Description),
            (1, GenerationStage::Details),
            (2, GenerationStage::Name),
        ];

        for (call, stage) in cases {
            let chat = dish_chat().with_failure_on_call(call);
            let handle = chat.clone();
            let app = build_app(chat, MockImageGenerationClient::new(), MenuVariant::Dish);

            let err = app
                .generate_dish("duck", &StyleProfile::new())
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Generation(s) if s == stage));
            assert_eq!(handle.get_call_count(), call + 1);
        }
    }

    #[tokio::test]
    async fn test_name_that_cleans_to_nothing_fails_the_dish() {
        for reply in ["", "**", "\"\"", "Name:"] {
            let chat = MockChatClient::new()
                .with_response(DESCRIPTION)
                .with_response(DETAILS)
                .with_response(reply);
            let app = build_app(chat, MockImageGenerationClient::new(), MenuVariant::Dish);

            let err = app
                .generate_dish("duck", &StyleProfile::new())
                .await
                .unwrap_err();
            assert!(
                matches!(err, Error::Generation(GenerationStage::Name)),
                "reply {:?} gave {:?}",
                reply,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_generate_menu_attaches_image_from_description() {
        let image_gen = MockImageGenerationClient::new();
        let image_handle = image_gen.clone();
        let app = build_app(dish_chat(), image_gen, MenuVariant::Dish);

        let menu = app
            .generate_menu("duck", &StyleProfile::new())
            .await
            .unwrap();

        let MenuResponse::Dish(dish) = menu else {
            panic!("expected a dish");
        };
        assert_eq!(dish.image_url.as_deref(), Some(MOCK_IMAGE_URL));
        assert_eq!(image_handle.get_prompts(), vec![DESCRIPTION.to_string()]);
    }

    #[tokio::test]
    async fn test_image_failure_still_returns_dish() {
        let app = build_app(
            dish_chat(),
            MockImageGenerationClient::new().with_failure(true),
            MenuVariant::Dish,
        );

        let menu = app
            .generate_menu("duck", &StyleProfile::new())
            .await
            .unwrap();

        let MenuResponse::Dish(dish) = menu else {
            panic!("expected a dish");
        };
        assert!(dish.image_url.is_none());
        assert_eq!(dish.short_name, "Golden Hour Duck");
    }

    #[tokio::test]
    async fn test_image_is_skipped_when_text_generation_fails() {
        let image_gen = MockImageGenerationClient::new();
        let image_handle = image_gen.clone();
        let app = build_app(
            dish_chat().with_failure_on_call(0),
            image_gen,
            MenuVariant::Dish,
        );

        assert!(app.generate_menu("duck", &StyleProfile::new()).await.is_err());
        assert_eq!(image_handle.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_generate_courses_splits_in_header_order() {
        let chat = MockChatClient::new().with_response(COURSES);
        let handle = chat.clone();
        let app = build_app(chat, MockImageGenerationClient::new(), MenuVariant::Courses);

        let style = StyleProfile::new().with("Comfort", 9);
        let courses = app.generate_courses("spring", &style).await.unwrap();

        assert_eq!(courses.len(), 3);
        assert_eq!(courses[0].name, "Pea Velouté");
        assert_eq!(courses[0].description, "Silky spring peas.");
        assert_eq!(courses[1].name, "Honey Duck");
        assert_eq!(courses[1].ingredients, "duck");
        // No Name: line, so the header title is used.
        assert_eq!(courses[2].name, "Pear Tart");
        assert_eq!(courses[2].instructions, "Bake.");

        let requests = handle.get_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].user.contains("Comfort: 9"));
    }

    #[tokio::test]
    async fn test_generate_courses_without_headers_fails() {
        let chat = MockChatClient::new().with_response("Name: Soup\nDescription: Warm.");
        let app = build_app(chat, MockImageGenerationClient::new(), MenuVariant::Courses);

        let err = app
            .generate_courses("soup", &StyleProfile::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(GenerationStage::Courses)));
    }

    #[tokio::test]
    async fn test_course_menu_image_uses_joined_descriptions() {
        let image_gen = MockImageGenerationClient::new();
        let image_handle = image_gen.clone();
        let app = build_app(
            MockChatClient::new().with_response(COURSES),
            image_gen,
            MenuVariant::Courses,
        );

        let menu = app
            .generate_menu("spring", &StyleProfile::new())
            .await
            .unwrap();

        let MenuResponse::Courses(menu) = menu else {
            panic!("expected courses");
        };
        assert_eq!(menu.courses.len(), 3);
        assert_eq!(menu.image_url.as_deref(), Some(MOCK_IMAGE_URL));
        assert_eq!(
            image_handle.get_prompts(),
            vec!["Silky spring peas.\n\nLacquered duck.\n\nCaramelised pear.".to_string()]
        );
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("\"Golden Hour Duck\""), "Golden Hour Duck");
        assert_eq!(clean_name("Name: Ember & Ash"), "Ember & Ash");
        assert_eq!(clean_name("**Velvet Pear**"), "Velvet Pear");
    }
}
