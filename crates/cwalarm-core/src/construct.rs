use cwalarm_types::ResourceHandle;
use tracing::{debug, info};

use crate::aspect::Aspect;
use crate::error::{AlarmError, Result};
use crate::provision::AlarmProvisioner;

/// 构造节点类型
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// 栈或普通构造，本身不被监控
    Scope,
    /// 可被监控的资源
    Resource(ResourceHandle),
}

/// 构造树节点
///
/// 路径由父节点在 `add_child` 时分配：根节点路径为其 ID，子节点为 `<父路径>/<ID>`。
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructNode {
    id: String,
    path: String,
    kind: NodeKind,
    children: Vec<ConstructNode>,
}

impl ConstructNode {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        let id = id.into();
        Self {
            path: id.clone(),
            id,
            kind,
            children: Vec::new(),
        }
    }

    pub fn scope(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Scope)
    }

    pub fn resource(id: impl Into<String>, handle: ResourceHandle) -> Self {
        Self::new(id, NodeKind::Resource(handle))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// 资源句柄（作用域节点返回 None）
    pub fn resource_handle(&self) -> Option<&ResourceHandle> {
        match &self.kind {
            NodeKind::Resource(handle) => Some(handle),
            NodeKind::Scope => None,
        }
    }

    pub fn children(&self) -> &[ConstructNode] {
        &self.children
    }

    /// 添加子节点
    ///
    /// # 错误
    /// * `DuplicateConstruct` - 同一父节点下已存在相同 ID
    pub fn add_child(&mut self, mut child: ConstructNode) -> Result<&mut ConstructNode> {
        if self.children.iter().any(|c| c.id == child.id) {
            return Err(AlarmError::DuplicateConstruct(format!(
                "{}/{}",
                self.path, child.id
            )));
        }

        child.rebase(&self.path);
        debug!(path = %child.path, "Construct added");

        self.children.push(child);
        let last = self.children.len() - 1;
        Ok(&mut self.children[last])
    }

    /// 链式添加子节点
    pub fn with_child(mut self, child: ConstructNode) -> Result<Self> {
        self.add_child(child)?;
        Ok(self)
    }

    fn rebase(&mut self, parent_path: &str) {
        self.path = format!("{}/{}", parent_path, self.id);
        let path = self.path.clone();
        for child in &mut self.children {
            child.rebase(&path);
        }
    }

    /// 先序遍历：父节点先于子节点，子节点按添加顺序
    pub fn walk<F>(&self, visitor: &mut F) -> Result<()>
    where
        F: FnMut(&ConstructNode) -> Result<()>,
    {
        visitor(self)?;
        for child in &self.children {
            child.walk(visitor)?;
        }
        Ok(())
    }

    /// 按路径查找节点
    pub fn find(&self, path: &str) -> Option<&ConstructNode> {
        if self.path == path {
            return Some(self);
        }
        let prefix = format!("{}/", self.path);
        if !path.starts_with(&prefix) {
            return None;
        }
        self.children.iter().find_map(|child| child.find(path))
    }

    /// 子树中的节点总数（含自身）
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// 对整棵子树应用一个切面
    pub fn apply_aspect(
        &self,
        aspect: &dyn Aspect,
        provisioner: &mut dyn AlarmProvisioner,
    ) -> Result<()> {
        self.walk(&mut |node: &ConstructNode| aspect.visit(node, provisioner))?;
        info!(root = %self.path, aspect = aspect.name(), "Aspect applied");
        Ok(())
    }

    /// 依次应用多个切面，每个切面遍历整棵子树
    pub fn apply_aspects(
        &self,
        aspects: &[Box<dyn Aspect>],
        provisioner: &mut dyn AlarmProvisioner,
    ) -> Result<()> {
        for aspect in aspects {
            self.apply_aspect(aspect.as_ref(), provisioner)?;
        }
        Ok(())
    }
}
