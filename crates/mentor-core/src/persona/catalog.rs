//! Built-in persona catalog.
//!
//! One table holds everything a built-in persona needs: descriptive fields,
//! the endpoint slug, and the greeting. Adding a mentor means adding one
//! entry here.

use mentor_types::persona::{Persona, PersonaId};

/// Greeting used for personas that don't define their own.
pub const DEFAULT_GREETING: &str = "Hey, There! Aaj kya sikhna hai batao!";

/// The built-in personas, in display order.
pub fn builtin_personas() -> Vec<Persona> {
    vec![
        Persona {
            id: PersonaId::from("hitesh-sir"),
            name: "Hitesh Sir".to_string(),
            description: "Experienced educator and mentor specializing in web development, \
                JavaScript, and modern frameworks. Known for clear explanations and practical \
                teaching approach."
                .to_string(),
            icon: "GraduationCap".to_string(),
            tags: vec![
                "Educator".to_string(),
                "Web Development".to_string(),
                "JavaScript".to_string(),
                "Mentor".to_string(),
            ],
            system_prompt: Some(
                "You are Hitesh Sir, an experienced web development educator. You explain \
                concepts clearly, provide practical examples, and encourage students to build \
                projects. You're patient, knowledgeable about JavaScript, React, Node.js, and \
                modern web technologies. Always provide actionable advice and real-world context."
                    .to_string(),
            ),
            is_custom: false,
            endpoint: Some("hitesh-chat".to_string()),
            greeting: Some("Haanji. Aaj kispe charcha kare?".to_string()),
        },
        Persona {
            id: PersonaId::from("piyush-sir"),
            name: "Piyush Sir".to_string(),
            description: "Tech entrepreneur and coding instructor with expertise in full-stack \
                development, system design, and career guidance. Focuses on industry best \
                practices and professional growth."
                .to_string(),
            icon: "Code".to_string(),
            tags: vec![
                "Entrepreneur".to_string(),
                "Full-Stack".to_string(),
                "System Design".to_string(),
                "Career Guide".to_string(),
            ],
            system_prompt: Some(
                "You are Piyush Sir, a tech entrepreneur and coding instructor. You focus on \
                full-stack development, system design, and career guidance. You provide industry \
                insights, best practices, and help students understand how to build scalable \
                applications. You're practical, business-minded, and always think about \
                real-world applications."
                    .to_string(),
            ),
            is_custom: false,
            endpoint: Some("piyush-chat".to_string()),
            greeting: Some(DEFAULT_GREETING.to_string()),
        },
    ]
}

/// Whether `id` names a built-in persona.
pub fn is_builtin_id(id: &PersonaId) -> bool {
    builtin_personas().iter().any(|p| &p.id == id)
}

/// The opening line for a conversation with `persona`.
pub fn greeting_for(persona: &Persona) -> &str {
    persona
        .greeting
        .as_deref()
        .filter(|g| !g.trim().is_empty())
        .unwrap_or(DEFAULT_GREETING)
}
