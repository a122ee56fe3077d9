//! Prompt text sent to the model gateway.

use crate::domain::chat::ChatMessage;

const GUIDE_PERSONA: &str = "You are 'Sahyadri', a warm, enthusiastic, and knowledgeable local guide from Maharashtra. Your tone is friendly, exciting, and inviting, like talking to a best friend. Use emojis 🌿🏰🌊 heavily to make the conversation lively. Avoid robotic or dry responses. When describing places, mention a fascinating legend, a hidden gem, or a must-try local dish 🍛. Make the user feel the 'Maharashtra Dharma' (hospitality). Always encourage them to visit! Keep it concise.";

const SEASON_EXPERT: &str = "You are an expert Maharashtra travel guide.";

const ITINERARY_PLANNER: &str = "You are an expert local guide for Maharashtra, India. You answer itinerary requests with a single JSON object and nothing else.";

pub fn chat(user_message: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(GUIDE_PERSONA),
        ChatMessage::user(user_message),
    ]
}

pub fn season_explanation(season: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SEASON_EXPERT),
        ChatMessage::user(format!(
            "Explain why {} is a good or bad time to visit specific parts of Maharashtra. Keep it brief and travel-focused.",
            season
        )),
    ]
}

pub fn itinerary(city: &str, days: u32, season: &str, language: &str) -> Vec<ChatMessage> {
    let prompt = format!(
        r#"User Request: Create a {days}-day itinerary for "{city}" in {season} season.
Target Language: {language} (Strictly enforce this).

STEP 1: VALIDATE LOCATION
- Is "{city}" a known place in Maharashtra, India?
- If it is a locality (e.g., "Shivajinagar", "Bandra"), assume the main city (e.g., "Pune", "Mumbai") and proceed.
- If it is NOT in Maharashtra (e.g., "Delhi", "Paris", "Bangalore"), RETURN ERROR JSON.

STEP 2: GENERATE ITINERARY
- If valid, create a detailed day-by-day plan.

CRITICAL:
- Return ONLY valid JSON.
- NO trailing commas.
- NO comments (like // or /* */) inside the JSON.
- NO markdown formatting.

Format for SUCCESS:
{{
  "valid": true,
  "city_name": "Pune",
  "itinerary": [
    {{
      "day": 1,
      "details": "Morning: Visit Shaniwar Wada..."
    }}
  ],
  "location_names": [
    "Shaniwar Wada, Pune",
    "Raja Dinkar Kelkar Museum, Pune"
  ]
}}

Format for ERROR (Not in Maharashtra):
{{
  "valid": false,
  "error": "I can only plan trips within Maharashtra. '{city}' seems to be outside."
}}

IMPORTANT for "location_names":
1. Order them geographically for a smooth route.
2. Use English for location names to ensure map compatibility.
3. Include 4-6 key stops."#
    );

    vec![
        ChatMessage::system(ITINERARY_PLANNER),
        ChatMessage::user(prompt),
    ]
}
