//! # 元素语义命名
//!
//! 纯函数：节点表 + 节点 id → 可读描述（如 "the 'Cancel Subscription' button"），
//! 让日志写出 "点了什么" 而不是裸 id。
//!
//! ## 名称优先级
//! 1. `aria-label`
//! 2. 较短的可见文本
//! 3. 表单控件：按钮类 input 的 `value`、`placeholder`、`name`
//! 4. `title` / `alt`
//! 5. 标签名 + 第一个非工具类 class（如 "the div.pricing-card element"）
//! 6. 兜底 `element #<id>`
//!
//! 点击落在文本节点或无名称的子元素（如按钮里的图标）上时，
//! 向上最多 3 层寻找可交互祖先，按祖先命名。
//! 所有名称在嵌入描述前都经过脱敏。

use std::sync::LazyLock;

use regex::Regex;

use crate::models::node::{NodeDescriptor, NodeKind};
use crate::services::node_map::NodeMap;
use crate::services::redactor::redact;

/// 向上寻找可交互祖先的最大层数
const MAX_ANCESTOR_HOPS: usize = 3;

/// 工具类 class 识别正则
///
/// 匹配 Tailwind / Bootstrap 风格的原子类、带变体前缀的类（`md:flex`）、
/// CSS-in-JS 生成的哈希类（`css-1x2y3z`、`sc-abc`、`jsx-123`）。
static UTILITY_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        [:\[]                                   # 变体前缀或任意值
        | ^(?:css|sc|jsx|emotion|svelte)-        # CSS-in-JS 哈希
        | ^_
        | ^-?(?:[mp][trblxy]?|w|h|z|gap|inset|top|left|right|bottom|min-w|min-h|max-w|max-h)-
        | ^(?:flex|grid|block|inline|inline-block|inline-flex|hidden|relative|absolute|fixed|sticky|static|container|row|col|clearfix|truncate|shadow|rounded|border|transition|uppercase|lowercase|capitalize|italic|underline)$
        | ^(?:flex|grid|text|bg|border|rounded|shadow|font|items|justify|self|content|place|space|divide|ring|opacity|cursor|overflow|transition|duration|ease|leading|tracking|col|row|order|d|align)-
        ",
    )
    .unwrap()
});

/// 生成节点的可读描述
///
/// 确定性、无副作用，永不 panic：节点表中找不到的 id 退化为 `element #<id>`。
///
/// # 参数
/// - `map` - 当前节点表
/// - `id` - 交互事件引用的节点 id
/// - `max_label_chars` - 可见文本作为名称的最大字符数
pub fn describe(map: &NodeMap, id: i64, max_label_chars: usize) -> String {
    let Some(node) = resolve_target(map, id) else {
        return format!("element #{}", id);
    };
    if node.kind != NodeKind::Element {
        return format!("element #{}", id);
    }

    let noun = role_noun(node);
    if let Some(label) = label_for(map, node, max_label_chars) {
        return format!("the '{}' {}", redact(&label), noun);
    }

    match (node.tag.as_deref(), first_semantic_class(node)) {
        (Some(tag), Some(class)) => format!("the {}.{} {}", tag, redact(class), noun),
        (Some(tag), None) if noun == "element" => format!("the {} element", tag),
        (Some(_), None) => format!("the {}", noun),
        (None, _) => format!("element #{}", id),
    }
}

/// 悬停目标是否可交互（`hesitation_interactive_only` 开启时用于犹豫检测）
pub fn is_interactive_target(map: &NodeMap, id: i64) -> bool {
    resolve_target(map, id).is_some_and(is_interactive)
}

/// 节点是否是复选框 / 单选框（输入事件按勾选状态记录）
pub fn is_toggle_control(map: &NodeMap, id: i64) -> bool {
    map.get(id).is_some_and(|n| {
        n.is_tag("input") && matches!(n.input_type().as_deref(), Some("checkbox" | "radio"))
    })
}

/// 节点是否是提交类控件
///
/// - `input` / `button` 且 `type` 为 submit 或 image
/// - 未声明 `type` 的 `<button>` 且位于 `<form>` 内（浏览器默认行为即提交）
pub fn is_submit_control(map: &NodeMap, id: i64) -> bool {
    let Some(node) = resolve_target(map, id) else {
        return false;
    };
    let input_type = node.input_type();
    if (node.is_tag("input") || node.is_tag("button"))
        && matches!(input_type.as_deref(), Some("submit") | Some("image"))
    {
        return true;
    }
    node.is_tag("button")
        && input_type.is_none()
        && map.ancestors(node.id as i64).any(|a| a.is_tag("form"))
}

/// 节点是否是密码输入框（输入内容整体屏蔽）
pub fn is_password_field(map: &NodeMap, id: i64) -> bool {
    map.get(id)
        .is_some_and(|n| n.is_tag("input") && n.input_type().as_deref() == Some("password"))
}

/// 找到真正用于命名的节点
///
/// 文本节点转到父元素；自身不可交互且没有 aria-label 的元素，
/// 若 3 层内存在可交互祖先，则使用该祖先。
fn resolve_target(map: &NodeMap, id: i64) -> Option<&NodeDescriptor> {
    let mut node = map.get(id)?;
    if node.kind == NodeKind::Text {
        node = node.parent.and_then(|p| map.get(p as i64))?;
    }
    if is_interactive(node) || node.attr("aria-label").is_some() {
        return Some(node);
    }
    let ancestor = map
        .ancestors(node.id as i64)
        .take(MAX_ANCESTOR_HOPS)
        .find(|a| is_interactive(a));
    Some(ancestor.unwrap_or(node))
}

/// 可交互元素：按钮、链接、表单控件，以及声明了交互 role 的元素
fn is_interactive(node: &NodeDescriptor) -> bool {
    let tag_interactive = matches!(
        node.tag.as_deref(),
        Some("button" | "a" | "input" | "select" | "textarea" | "label" | "summary" | "option")
    );
    tag_interactive
        || matches!(
            node.attr("role"),
            Some("button" | "link" | "tab" | "menuitem" | "checkbox" | "switch" | "radio" | "option")
        )
}

/// 按优先级提取名称
fn label_for(map: &NodeMap, node: &NodeDescriptor, max_label_chars: usize) -> Option<String> {
    if let Some(aria) = node.attr("aria-label") {
        return Some(aria.to_string());
    }

    let is_form_control = matches!(node.tag.as_deref(), Some("input" | "select" | "textarea"));
    // 表单控件的子文本是选项列表等内容，不代表控件名称
    if !is_form_control {
        let text = map.visible_text(node.id as i64, max_label_chars);
        if !text.is_empty() && text.chars().count() <= max_label_chars {
            return Some(text);
        }
    }

    if is_form_control {
        let button_like = matches!(
            node.input_type().as_deref(),
            Some("submit" | "button" | "reset")
        );
        if button_like {
            if let Some(value) = node.attr("value") {
                return Some(value.to_string());
            }
        }
        if let Some(v) = node.attr("placeholder").or_else(|| node.attr("name")) {
            return Some(v.to_string());
        }
    }

    node.attr("title")
        .or_else(|| node.attr("alt"))
        .map(|v| v.to_string())
}

/// 元素角色名词
fn role_noun(node: &NodeDescriptor) -> &'static str {
    match node.attr("role") {
        Some("button") => return "button",
        Some("link") => return "link",
        Some("tab") => return "tab",
        Some("menuitem") => return "menu item",
        Some("checkbox") | Some("switch") => return "checkbox",
        _ => {}
    }
    match node.tag.as_deref() {
        Some("button") => "button",
        Some("a") => "link",
        Some("input") => match node.input_type().as_deref() {
            Some("submit" | "button" | "reset" | "image") => "button",
            Some("checkbox") => "checkbox",
            Some("radio") => "radio button",
            _ => "field",
        },
        Some("textarea") => "text area",
        Some("select") => "dropdown",
        Some("option") => "option",
        Some("img") | Some("svg") => "image",
        Some("label") => "label",
        Some("li") => "list item",
        Some("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => "heading",
        Some("video") => "video",
        Some("audio") => "audio player",
        _ => "element",
    }
}

/// 第一个非工具类 class
fn first_semantic_class(node: &NodeDescriptor) -> Option<&str> {
    node.attr("class")?
        .split_whitespace()
        .find(|c| c.len() > 2 && !UTILITY_CLASS_RE.is_match(c))
}
