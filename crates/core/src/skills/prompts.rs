//! Stage instruction blocks bundled at compile time.

/// Designer - turns extracted design data into a design analysis
pub const DESIGNER: &str = include_str!("defaults/designer.md");

/// Designer, screenshot mode - reads the attached images directly
pub const DESIGNER_IMAGES: &str = include_str!("defaults/designer_images.md");

/// Architect - maps the analysis onto a component design document
pub const ARCHITECT: &str = include_str!("defaults/architect.md");

/// Coder - generates source files from the design document
pub const CODER: &str = include_str!("defaults/coder.md");

/// Reviewer - scores the generated code against the design
pub const REVIEWER: &str = include_str!("defaults/reviewer.md");

/// All stage prompts with their slugs
pub fn all_defaults() -> Vec<(&'static str, &'static str)> {
    vec![
        ("designer", DESIGNER),
        ("designer_images", DESIGNER_IMAGES),
        ("architect", ARCHITECT),
        ("coder", CODER),
        ("reviewer", REVIEWER),
    ]
}

/// Look up a prompt by slug.
pub fn by_slug(slug: &str) -> Option<&'static str> {
    all_defaults()
        .into_iter()
        .find(|(s, _)| *s == slug)
        .map(|(_, content)| content)
}
