//! 命令表
//!
//! 命令表是一棵带标签的树：叶子是处理函数，节点是命名子表。
//! 查找时每层消耗一个 token，精确匹配（区分大小写，不支持前缀缩写）。

/// 命令表条目
#[derive(Debug, Clone)]
pub enum CommandNode<H> {
    /// 处理函数
    Handler(H),
    /// 子命令表（如 `config set`）
    Group(CommandTable<H>),
}

/// 命令表：按插入顺序保存 (key, node)
pub type CommandTable<H> = Vec<(&'static str, CommandNode<H>)>;

/// 在命令表中查找处理函数
///
/// 成功时返回处理函数和剩余 token（作为位置参数）。
/// token 用尽、键不存在、或停在子表上都返回 `None`。
pub fn resolve<'a, H: Copy>(table: &[(&'static str, CommandNode<H>)], args: &'a [String]) -> Option<(H, &'a [String])> {
    let mut level = table;
    let mut rest = args;

    loop {
        let (key, tail) = rest.split_first()?;
        let (_, node) = level.iter().find(|(name, _)| *name == key.as_str())?;

        match node {
            CommandNode::Handler(handler) => return Some((*handler, tail)),
            CommandNode::Group(sub) => {
                level = sub;
                rest = tail;
            },
        }
    }
}

/// 列出命令表中所有可调用路径（如 `play quit`）
pub fn command_paths<H>(table: &[(&'static str, CommandNode<H>)]) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths(table, "", &mut paths);
    paths
}

fn collect_paths<H>(table: &[(&'static str, CommandNode<H>)], prefix: &str, out: &mut Vec<String>) {
    for (name, node) in table {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{} {}", prefix, name)
        };

        match node {
            CommandNode::Handler(_) => out.push(path),
            CommandNode::Group(sub) => collect_paths(sub, &path, out),
        }
    }
}
