//! Sample content used to seed an empty database.

use crate::story::{
    Character, GenerationRequest, OutlineBeat, Scene, StoryBeat, StoryPackage, BEAT_TYPES,
};
use crate::types::Timestamp;

/// A sample comic: `(title, initial_prompt)`.
pub const SAMPLE_COMICS: [(&str, &str); 3] = [
    (
        "Krishna's Divine Revelation",
        "Krishna revealing his cosmic form to Arjuna on the battlefield of Kurukshetra",
    ),
    (
        "Hanuman's Leap",
        "Hanuman leaping across the ocean to Lanka with the mountain of healing herbs",
    ),
    (
        "Durga's Battle",
        "Goddess Durga riding her lion into battle against the demon Mahishasura",
    ),
];

/// Placeholder artwork for seeded panels.
pub const SAMPLE_PANEL_URLS: [&str; 5] = [
    "https://images.unsplash.com/photo-1594736797933-d0501ba2fe65?q=80&w=1000",
    "https://images.unsplash.com/photo-1618759287629-ca97956abea9?q=80&w=1000",
    "https://images.unsplash.com/photo-1547995886-6dc09384c6e6?q=80&w=1000",
    "https://images.unsplash.com/photo-1580274455191-1c62238fa333?q=80&w=1000",
    "https://images.unsplash.com/photo-1636142369554-bb3c188f7266?q=80&w=1000",
];

/// Number of panels seeded for the comic at `comic_index` (two or three).
pub fn sample_panel_count(comic_index: usize) -> usize {
    2 + comic_index % 2
}

/// Placeholder image for panel `panel_index` of comic `comic_index`.
pub fn sample_panel_url(comic_index: usize, panel_index: usize) -> &'static str {
    SAMPLE_PANEL_URLS[(comic_index + panel_index) % SAMPLE_PANEL_URLS.len()]
}

pub const SAMPLE_STORY_THEME: &str = "A journey to find a magical artifact";

const SAMPLE_BEATS: [&str; 5] = [
    "Elara finds an old map sealed inside a carved cedar chest",
    "Moonlight wakes hidden markings on the map",
    "Elara crosses the Whispering Woods and gains two companions",
    "A guardian spirit tests what each of them truly wants",
    "The Crystal shows them the magic they brought with them",
];

/// `(id, name, role, arc, traits)`
const SAMPLE_CHARACTERS: [(&str, &str, &str, &str, [&str; 3]); 3] = [
    (
        "character1",
        "Elara",
        "protagonist",
        "from cautious to courageous",
        ["curious", "loyal", "resourceful"],
    ),
    (
        "character2",
        "Thorne",
        "deuteragonist",
        "from selfish to selfless",
        ["witty", "skilled", "guarded"],
    ),
    (
        "character3",
        "Maevis",
        "mentor",
        "from isolated to connected",
        ["wise", "eccentric", "patient"],
    ),
];

/// `(beat, title, setting, conflict)`
const SAMPLE_SCENES: [(u32, &str, &str, &str); 5] = [
    (
        1,
        "The Cedar Chest",
        "A cluttered attic full of forgotten things",
        "Elara must decide whether to follow the map",
    ),
    (
        2,
        "Silver Lines",
        "Elara's bedroom under a full moon",
        "The map reveals more than her family ever told her",
    ),
    (
        3,
        "Unlikely Companions",
        "The Whispering Woods",
        "Trust is thin between three strangers seeking the same prize",
    ),
    (
        4,
        "The Guardian's Question",
        "Ruined temple steps",
        "Each traveler must face their own reason for coming",
    ),
    (
        5,
        "Reflections",
        "The Crystal Chamber",
        "They must accept what the Crystal shows them",
    ),
];

const SAMPLE_PROSE: [[&str; 2]; 5] = [
    [
        "The attic smelled of cedar and old rain. Elara had come up for a box of photographs, \
         but the carved chest under the window held something else: a roll of parchment tied \
         with faded blue thread.",
        "When she opened it, the map showed places no atlas named. The Whispering Woods. The \
         Mirrored Lakes. And at the far edge, a temple marked with a single word: Echoes.",
    ],
    [
        "That night the moon slid across her floor and touched the parchment. Thin silver \
         lines rose out of the paper, tracing paths that had not been there an hour before.",
        "Along the border a sentence appeared in a script she could not read and somehow \
         understood. The Crystal waits for the one who seeks the truth, not power. By dawn \
         her bag was packed.",
    ],
    [
        "The woods murmured as she walked, leaves turning as if to watch her pass. Near dusk \
         a lean young man with a crossbow stepped onto the path and asked, far too casually, \
         where she was headed.",
        "Thorne wanted the Crystal to sell. Maevis, the old woman who found them both \
         arguing by her fire, wanted nothing at all, or said so. Elara decided three \
         travelers were safer than one.",
    ],
    [
        "The temple steps were cracked and warm. Halfway up, the air thickened into a figure \
         of light that spoke inside their heads and asked each of them why they had come.",
        "Thorne answered first and the steps crumbled under him until he told the truth. \
         Maevis wept. Elara said she did not know, and the guardian stepped aside.",
    ],
    [
        "The Crystal was smaller than her fist. When Elara looked into it she saw only \
         herself, a little taller, a little braver than the girl in the attic.",
        "Maevis laughed for the first time in years. Thorne put his coin purse away. They \
         walked home together, and the map, its work done, went quietly blank.",
    ],
];

/// A complete five-beat story package.
pub fn sample_story(generated_at: Timestamp) -> StoryPackage {
    let request = GenerationRequest::with_theme(SAMPLE_STORY_THEME);
    let mut package = StoryPackage::empty(request, generated_at);

    package.title = "The Crystal of Echoes".to_string();
    package.tagline = "Some journeys change more than just the traveler".to_string();
    package.summary = "A map hidden in her grandmother's attic sends Elara after the \
        legendary Crystal of Echoes. The companions she gathers on the road teach her \
        that the crystal only shows what the seeker already carries."
        .to_string();

    package.outline = BEAT_TYPES
        .iter()
        .zip(SAMPLE_BEATS)
        .enumerate()
        .map(|(i, (beat_type, description))| OutlineBeat {
            beat: i as u32 + 1,
            beat_type: beat_type.to_string(),
            description: description.to_string(),
        })
        .collect();
    package.characters = SAMPLE_CHARACTERS.iter().map(character).collect();
    package.scenes = SAMPLE_SCENES.iter().map(scene).collect();
    package.story = SAMPLE_PROSE
        .iter()
        .zip(1..)
        .map(|(paragraphs, beat)| prose(beat, paragraphs))
        .collect();

    package.metadata = package.compute_metadata();
    package
}

fn character(&(id, name, role, arc, traits): &(&str, &str, &str, &str, [&str; 3])) -> Character {
    Character {
        id: id.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        arc: arc.to_string(),
        traits: traits.iter().map(|t| t.to_string()).collect(),
    }
}

fn scene(&(beat, title, setting, conflict): &(u32, &str, &str, &str)) -> Scene {
    Scene {
        beat,
        title: title.to_string(),
        setting: setting.to_string(),
        pov: "Elara".to_string(),
        conflict: conflict.to_string(),
        image_url: None,
    }
}

fn prose(beat: u32, paragraphs: &[&str]) -> StoryBeat {
    StoryBeat {
        beat,
        paragraphs: paragraphs.iter().map(|p| p.to_string()).collect(),
    }
}
