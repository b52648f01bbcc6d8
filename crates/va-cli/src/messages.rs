//! User-facing messages in the configured language.

use va_core::{Language, StepStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Message {
    UploadFailed,
    UploadSucceeded,
    AddFileFailed,
    FileAdded,
    DeleteFailed,
    FileDeleted,
    AnalyzeFailed,
    AnalysisStarted,
    AnalysisAlreadyRunning,
    LoadFailed,
    NoSessionOpen,
    NoReport,
    NoFiles,
    CitationNotFound,
    Exported,
    ExportFailed,
    Imported,
    ImportFailed,
    Waiting,
    StartAnalysis,
    RerunAnalysis,
    AnalysisInProgress,
}

impl Message {
    #[must_use]
    pub const fn text(self, lang: Language) -> &'static str {
        match lang {
            Language::En => self.en(),
            Language::Zh => self.zh(),
        }
    }

    const fn en(self) -> &'static str {
        match self {
            Self::UploadFailed => "Upload failed, check the backend connection.",
            Self::UploadSucceeded => "Upload complete, session created.",
            Self::AddFileFailed => "Failed to add the file.",
            Self::FileAdded => "File added.",
            Self::DeleteFailed => "Failed to delete the file.",
            Self::FileDeleted => "File deleted.",
            Self::AnalyzeFailed => "Failed to start analysis",
            Self::AnalysisStarted => "Analysis started.",
            Self::AnalysisAlreadyRunning => "Analysis is already running.",
            Self::LoadFailed => "Failed to load the session.",
            Self::NoSessionOpen => "No session is open. Use 'list' and 'open <n>', or 'add <pdf>'.",
            Self::NoReport => "No report for this step yet.",
            Self::NoFiles => "This session has no documents.",
            Self::CitationNotFound => "No such citation in the current report.",
            Self::Exported => "Session exported.",
            Self::ExportFailed => "Export failed.",
            Self::Imported => "Session imported.",
            Self::ImportFailed => "Import failed.",
            Self::Waiting => "Waiting for analysis",
            Self::StartAnalysis => "Start analysis",
            Self::RerunAnalysis => "Re-run analysis",
            Self::AnalysisInProgress => "Analysis in progress...",
        }
    }

    const fn zh(self) -> &'static str {
        match self {
            Self::UploadFailed => "上传失败，请检查后台连接。",
            Self::UploadSucceeded => "上传成功，已创建会话。",
            Self::AddFileFailed => "添加文件失败。",
            Self::FileAdded => "文件添加成功。",
            Self::DeleteFailed => "删除文件失败。",
            Self::FileDeleted => "文件已删除。",
            Self::AnalyzeFailed => "启动分析失败",
            Self::AnalysisStarted => "分析已启动。",
            Self::AnalysisAlreadyRunning => "分析正在进行中。",
            Self::LoadFailed => "加载会话失败。",
            Self::NoSessionOpen => "尚未打开会话。使用 'list' 和 'open <n>'，或 'add <pdf>'。",
            Self::NoReport => "该步骤暂无分析结果。",
            Self::NoFiles => "该会话没有文档。",
            Self::CitationNotFound => "当前报告中没有该引用。",
            Self::Exported => "会话已导出。",
            Self::ExportFailed => "导出失败。",
            Self::Imported => "会话已导入。",
            Self::ImportFailed => "导入失败。",
            Self::Waiting => "等待分析完成",
            Self::StartAnalysis => "开始分析",
            Self::RerunAnalysis => "重新分析",
            Self::AnalysisInProgress => "分析进行中...",
        }
    }
}

/// Label for the run action given the selected step's status.
#[must_use]
pub const fn run_action_label(status: StepStatus, lang: Language) -> &'static str {
    match status {
        StepStatus::Running => Message::AnalysisInProgress.text(lang),
        StepStatus::Completed => Message::RerunAnalysis.text(lang),
        StepStatus::Pending | StepStatus::Failed => Message::StartAnalysis.text(lang),
    }
}
