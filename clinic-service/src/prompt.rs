/// Instruction sent with every consultation. It asks the model to stay on
/// medical topics; nothing in the service enforces it.
pub const MEDICAL_ONLY_INSTRUCTIONS: &str = "System notice: you are running in strict medical mode. \
Your only task is to answer medical questions. \
Any answer outside medicine is treated as a session failure. \
Do not chat, do not cook, do not write code. \
If you are asked about anything that is not medical, reply with: \
'Error: access blocked. I am dedicated to medicine only.'";

/// Generation temperature; zero keeps answers close to the instruction.
pub const TEMPERATURE: f32 = 0.0;

pub const VOICE_LABEL: &str = "🎤 [voice] ";
pub const IMAGE_LABEL: &str = "📸 [image] ";

/// Map search for the nearest hospital
pub const EMERGENCY_LINK: &str = "http://google.com/maps?q=hospital";
