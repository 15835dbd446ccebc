use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Именованные keysym'ы X11, которые нельзя вычислить из символа.
/// Первое имя для кода считается каноническим при обратном преобразовании.
const NAMED_KEYSYMS: &[(&str, u32)] = &[
    // Пунктуация
    ("space", 0x0020),
    ("apostrophe", 0x0027),
    ("comma", 0x002c),
    ("minus", 0x002d),
    ("period", 0x002e),
    ("slash", 0x002f),
    ("semicolon", 0x003b),
    ("equal", 0x003d),
    ("bracketleft", 0x005b),
    ("backslash", 0x005c),
    ("bracketright", 0x005d),
    ("grave", 0x0060),

    // Специальные клавиши
    ("backspace", 0xff08),
    ("tab", 0xff09),
    ("return", 0xff0d),
    ("pause", 0xff13),
    ("scroll_lock", 0xff14),
    ("escape", 0xff1b),
    ("delete", 0xffff),
    ("menu", 0xff67),
    ("num_lock", 0xff7f),

    // Навигация
    ("home", 0xff50),
    ("left", 0xff51),
    ("up", 0xff52),
    ("right", 0xff53),
    ("down", 0xff54),
    ("prior", 0xff55),
    ("page_up", 0xff55),
    ("next", 0xff56),
    ("page_down", 0xff56),
    ("end", 0xff57),
    ("print", 0xff61),
    ("insert", 0xff63),

    // Numpad
    ("kp_enter", 0xff8d),
    ("kp_multiply", 0xffaa),
    ("kp_add", 0xffab),
    ("kp_subtract", 0xffad),
    ("kp_decimal", 0xffae),
    ("kp_divide", 0xffaf),

    // Мультимедиа (XF86)
    ("xf86monbrightnessup", 0x1008ff02),
    ("xf86monbrightnessdown", 0x1008ff03),
    ("xf86audiolowervolume", 0x1008ff11),
    ("xf86audiomute", 0x1008ff12),
    ("xf86audioraisevolume", 0x1008ff13),
    ("xf86audioplay", 0x1008ff14),
    ("xf86audiostop", 0x1008ff15),
    ("xf86audioprev", 0x1008ff16),
    ("xf86audionext", 0x1008ff17),
    ("xf86homepage", 0x1008ff18),
    ("xf86mail", 0x1008ff19),
    ("xf86search", 0x1008ff1b),
    ("xf86calculator", 0x1008ff1d),
    ("xf86poweroff", 0x1008ff2a),
    ("xf86sleep", 0x1008ff2f),
    ("xf86wlan", 0x1008ff95),
    ("xf86touchpadtoggle", 0x1008ffa9),
    ("xf86audiomicmute", 0x1008ffb2),
];

static BY_NAME: Lazy<HashMap<&'static str, u32>> =
    Lazy::new(|| NAMED_KEYSYMS.iter().copied().collect());

const KEYSYM_F1: u32 = 0xffbe;
const KEYSYM_KP_0: u32 = 0xffb0;

/// Преобразование имён клавиш в keysym коды X11
/// Имена сравниваются без учёта регистра, как это делает рантайм оконного менеджера
pub struct KeyNameToKeysym;

impl KeyNameToKeysym {
    /// Получить keysym по имени клавиши
    pub fn translate(key_name: &str) -> Result<u32, String> {
        let normalized = key_name.to_lowercase();

        if let Some(code) = BY_NAME.get(normalized.as_str()) {
            return Ok(*code);
        }

        // Буквы и цифры совпадают со своим ASCII кодом
        let mut chars = normalized.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                return Ok(c as u32);
            }
        }

        // Функциональные клавиши f1..f24
        if let Some(n) = normalized.strip_prefix('f').and_then(|n| n.parse::<u32>().ok()) {
            if (1..=24).contains(&n) {
                return Ok(KEYSYM_F1 + n - 1);
            }
        }

        // Цифры numpad kp_0..kp_9
        if let Some(n) = normalized.strip_prefix("kp_").and_then(|n| n.parse::<u32>().ok()) {
            if n <= 9 {
                return Ok(KEYSYM_KP_0 + n);
            }
        }

        Err(format!("Unknown key: {}", key_name))
    }

    /// Получить каноническое имя клавиши по keysym
    pub fn reverse_translate(keysym: u32) -> Option<String> {
        if let Some((name, _)) = NAMED_KEYSYMS.iter().find(|(_, code)| *code == keysym) {
            return Some((*name).to_string());
        }

        match keysym {
            0x30..=0x39 | 0x61..=0x7a => char::from_u32(keysym).map(|c| c.to_string()),
            c if (KEYSYM_F1..KEYSYM_F1 + 24).contains(&c) => Some(format!("f{}", c - KEYSYM_F1 + 1)),
            c if (KEYSYM_KP_0..=KEYSYM_KP_0 + 9).contains(&c) => Some(format!("kp_{}", c - KEYSYM_KP_0)),
            _ => None,
        }
    }

    /// Проверить, известна ли клавиша
    pub fn is_known(key_name: &str) -> bool {
        Self::translate(key_name).is_ok()
    }
}
